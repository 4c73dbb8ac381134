pub mod numbering;
pub mod questions;
pub mod xml;

pub use numbering::{
    answer_numbers, extract_answer_keys, extract_numbered_elements, leading_number, AnswerKeys,
    NumberedElements,
};
pub use questions::extract_questions_with_options;
pub use xml::{decode_xml, read_xml, Document, Element, ParseMode, XmlError};
