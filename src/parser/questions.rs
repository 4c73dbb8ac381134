use super::xml::Document;
use crate::models::{QuestionRecord, TagNames};

/// Group option blocks under the question that precedes them
///
/// Walks the document once. A question element opens a new record; option
/// elements append to the open record until the next question. Records
/// without any option block are dropped, and option elements seen before
/// the first question are discarded.
pub fn extract_questions_with_options(doc: &Document, tags: &TagNames) -> Vec<QuestionRecord> {
    let mut records = Vec::new();
    let mut current: Option<QuestionRecord> = None;

    for elem in doc.elements() {
        if elem.name == tags.question {
            if let Some(done) = current.take() {
                if !done.option_blocks.is_empty() {
                    records.push(done);
                }
            }
            current = Some(QuestionRecord::new(elem.text.trim()));
        } else if elem.name == tags.option {
            if let Some(record) = current.as_mut() {
                record.option_blocks.push(elem.text.trim().to_string());
            }
        }
    }

    if let Some(done) = current {
        if !done.option_blocks.is_empty() {
            records.push(done);
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xml::ParseMode;

    fn parse(xml: &str) -> Vec<QuestionRecord> {
        let doc = Document::parse(xml, ParseMode::Strict).unwrap();
        extract_questions_with_options(&doc, &TagNames::default())
    }

    #[test]
    fn test_groups_options_under_preceding_question() {
        let records = parse(
            r#"<Root>
                <Question>1. Capital of France?</Question>
                <Option-2>(a) Paris (b) Lyon</Option-2>
                <Option-2>(c) Nice (d) Lille</Option-2>
                <Question>2. Capital of Italy?</Question>
                <Option-2>(a) Rome (b) Milan (c) Turin (d) Naples</Option-2>
            </Root>"#,
        );

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].number, "1");
        assert_eq!(records[0].text, "1. Capital of France?");
        assert_eq!(
            records[0].option_blocks,
            vec!["(a) Paris (b) Lyon", "(c) Nice (d) Lille"]
        );
        assert_eq!(records[1].number, "2");
        assert_eq!(records[1].option_blocks.len(), 1);
    }

    #[test]
    fn test_question_without_options_is_dropped() {
        let records = parse(
            r#"<Root>
                <Question>1. No options here</Question>
                <Question>2. Has options</Question>
                <Option-2>(a) x (b) y (c) z (d) w</Option-2>
                <Question>3. Trailing, no options</Question>
            </Root>"#,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, "2");
    }

    #[test]
    fn test_options_before_first_question_are_discarded() {
        let records = parse(
            r#"<Root>
                <Option-2>(a) orphan</Option-2>
                <Question>1. Real</Question>
                <Option-2>(a) x</Option-2>
            </Root>"#,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].option_blocks, vec!["(a) x"]);
    }

    #[test]
    fn test_nested_options_follow_document_order() {
        let records = parse(
            r#"<Root>
                <Block><Question>5. Nested</Question></Block>
                <Block><Option-2>(a) one</Option-2><Option-2/></Block>
            </Root>"#,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].option_blocks, vec!["(a) one", ""]);
    }

    #[test]
    fn test_question_without_text_keeps_placeholder_number() {
        let records = parse("<Root><Question/><Option-2>(a) x</Option-2></Root>");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].number, "?");
        assert_eq!(records[0].text, "");
    }

    #[test]
    fn test_custom_tag_names() {
        let doc = Document::parse(
            "<Root><Q>1. One</Q><Opt>(a) x</Opt></Root>",
            ParseMode::Strict,
        )
        .unwrap();
        let tags = TagNames {
            question: "Q".into(),
            option: "Opt".into(),
            ..TagNames::default()
        };

        let records = extract_questions_with_options(&doc, &tags);
        assert_eq!(records.len(), 1);
    }
}
