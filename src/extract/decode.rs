//! Decoder for the version 1 instruction schema.

use super::ContentDecoder;
use crate::error::ExtractError;
use crate::notification::{Parameter, RenderedView, INSTRUCTION_SCHEMA_V1};

const SET_TEXT: &str = "setText";

/// Collects the character sequences of `setText` instructions.
///
/// Instructions without a method and all other operations are skipped. A
/// `setText` whose first parameter is not a character sequence fails the
/// whole decode, since the layout no longer matches what we expect.
#[derive(Debug, Clone, Default)]
pub struct TextActionDecoder;

impl ContentDecoder for TextActionDecoder {
    fn schema(&self) -> u32 {
        INSTRUCTION_SCHEMA_V1
    }

    fn text_fragments(&self, view: &RenderedView) -> Result<Vec<String>, ExtractError> {
        if view.schema != self.schema() {
            return Err(ExtractError::UnsupportedSchema {
                found: view.schema,
                expected: self.schema(),
            });
        }

        let mut fragments = Vec::new();
        for action in &view.actions {
            let Some(method) = action.method.as_deref() else {
                continue;
            };
            if method != SET_TEXT {
                continue;
            }

            match action.parameters.first() {
                Some(Parameter::CharSequence(text)) => fragments.push(text.trim().to_string()),
                _ => {
                    return Err(ExtractError::MissingText {
                        view_id: action.view_id,
                    })
                }
            }
        }

        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Instruction;

    fn set_text(view_id: i32, text: &str) -> Instruction {
        Instruction {
            view_id,
            method: Some(SET_TEXT.to_string()),
            parameters: vec![Parameter::CharSequence(text.to_string())],
        }
    }

    #[test]
    fn test_collects_set_text_in_order() {
        let view = RenderedView {
            schema: INSTRUCTION_SCHEMA_V1,
            actions: vec![
                set_text(1, " 120 "),
                Instruction {
                    view_id: 2,
                    method: Some("setImageResource".to_string()),
                    parameters: vec![Parameter::Int(42)],
                },
                Instruction {
                    view_id: 3,
                    method: None,
                    parameters: Vec::new(),
                },
                set_text(4, "mg/dl\n"),
            ],
        };

        let fragments = TextActionDecoder.text_fragments(&view).unwrap();
        assert_eq!(fragments, vec!["120", "mg/dl"]);
    }

    #[test]
    fn test_set_text_with_wrong_parameter_fails() {
        let view = RenderedView {
            schema: INSTRUCTION_SCHEMA_V1,
            actions: vec![
                set_text(1, "120"),
                Instruction {
                    view_id: 7,
                    method: Some(SET_TEXT.to_string()),
                    parameters: vec![Parameter::Int(120)],
                },
            ],
        };

        let err = TextActionDecoder.text_fragments(&view).unwrap_err();
        assert_eq!(err, ExtractError::MissingText { view_id: 7 });
    }

    #[test]
    fn test_set_text_without_parameters_fails() {
        let view = RenderedView {
            schema: INSTRUCTION_SCHEMA_V1,
            actions: vec![Instruction {
                view_id: 9,
                method: Some(SET_TEXT.to_string()),
                parameters: Vec::new(),
            }],
        };

        assert!(TextActionDecoder.text_fragments(&view).is_err());
    }

    #[test]
    fn test_rejects_unknown_schema() {
        let view = RenderedView {
            schema: 2,
            actions: vec![set_text(1, "120")],
        };

        let err = TextActionDecoder.text_fragments(&view).unwrap_err();
        assert_eq!(
            err,
            ExtractError::UnsupportedSchema {
                found: 2,
                expected: 1
            }
        );
    }
}
