//! Prompt construction for the generative backend
//!
//! The prompt fixes the output contract the parser relies on: the article
//! opens with `# <title>`, sections use `## <heading>`, and the last line is a
//! `#タグ: a, b, c` tag suggestion.

use super::BlogIdea;

/// Build the instruction string for an idea
pub fn build_prompt(idea: &BlogIdea) -> String {
    let contexts = idea.non_blank_contexts().collect::<Vec<_>>().join("\n\n");

    format!(
        r#"
あなたは、AIエージェント関連の高品質な記事を書くプロの執筆者です。以下の情報をもとに、多段で深みのある記事を作成してください。

# ブログ企画情報
タイトル: {title}
説明: {description}
ターゲットオーディエンス: {audience}
重要なポイント: {key_points}

# 追加コンテキスト
{contexts}

# 執筆指示
1. 記事は「# タイトル」から始め、その後に「## 見出し」を使って構造化してください。
2. 記事は深い洞察と具体的な例を含む、多段階の詳細な内容にしてください。
3. AIエージェントの技術的側面と実用的な応用の両方をカバーしてください。
4. 最新の研究や動向を反映させ、未来への展望も含めてください。
5. 読者が実際に行動できる具体的なアドバイスや次のステップを提供してください。
6. 記事の最後に、関連するタグを5つ程度、以下の形式で提案してください:
   「#タグ: AI, エージェント, 技術, ...」

# 記事の構成
- 導入部: 読者の関心を引く魅力的な導入
- 本文: 複数のセクションに分けて詳細に説明
- 結論: 主要なポイントをまとめ、読者に行動を促す

記事の長さは3000〜5000文字程度を目安にしてください。
"#,
        title = idea.title,
        description = idea.description,
        audience = idea.target_audience,
        key_points = idea.key_points,
        contexts = contexts,
    )
}
