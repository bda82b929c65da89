use serde_json::{json, Value};

use crate::models::{is_placeholder, Section, StructuredTestCases, SubCategory, PLACEHOLDER};

/// Comentario listo para publicar en el ticket, en las dos formas que acepta Jira
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Wiki markup (API v2)
    pub markup: String,
    /// Atlassian Document Format (API v3)
    pub document: Value,
}

impl Comment {
    pub fn from_cases(cases: &StructuredTestCases) -> Self {
        Comment {
            markup: to_markup(cases),
            document: to_adf(cases),
        }
    }
}

fn section_title(section: Section) -> String {
    format!("{} Test Cases", section.label())
}

fn sub_category_title(sub: SubCategory) -> String {
    format!("{}s", sub.label())
}

fn visible_cases(cases: &StructuredTestCases, section: Section, sub: SubCategory) -> Vec<&str> {
    cases
        .group(section)
        .cases(sub)
        .iter()
        .filter(|case| !is_placeholder(case))
        .map(String::as_str)
        .collect()
}

/// Genera el comentario en wiki markup de Jira.
///
/// El orden de secciones y subcategorías es fijo.
pub fn to_markup(cases: &StructuredTestCases) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (index, section) in Section::ALL.into_iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.push(format!("h2. {}", section_title(section)));

        for sub in SubCategory::ALL {
            lines.push(format!("*{}*", sub_category_title(sub)));

            let visible = visible_cases(cases, section, sub);
            if visible.is_empty() {
                lines.push(PLACEHOLDER.to_string());
            } else {
                lines.extend(visible.iter().map(|case| format!("- {}", case)));
            }
        }
    }

    lines.join("\n")
}

fn text_node(text: &str) -> Value {
    json!({ "type": "text", "text": text })
}

fn marked_paragraph(text: &str, mark: &str) -> Value {
    json!({
        "type": "paragraph",
        "content": [{ "type": "text", "text": text, "marks": [{ "type": mark }] }]
    })
}

/// Genera el mismo comentario como documento ADF
pub fn to_adf(cases: &StructuredTestCases) -> Value {
    let placeholder = PLACEHOLDER.trim_matches('_');
    let mut content = Vec::new();

    for section in Section::ALL {
        content.push(json!({
            "type": "heading",
            "attrs": { "level": 2 },
            "content": [text_node(&section_title(section))]
        }));

        for sub in SubCategory::ALL {
            content.push(marked_paragraph(&sub_category_title(sub), "strong"));

            let visible = visible_cases(cases, section, sub);
            if visible.is_empty() {
                content.push(marked_paragraph(placeholder, "em"));
            } else {
                let items: Vec<Value> = visible
                    .iter()
                    .map(|case| {
                        json!({
                            "type": "listItem",
                            "content": [{ "type": "paragraph", "content": [text_node(case)] }]
                        })
                    })
                    .collect();
                content.push(json!({ "type": "bulletList", "content": items }));
            }
        }
    }

    json!({ "version": 1, "type": "doc", "content": content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaseGroup;

    fn sample() -> StructuredTestCases {
        StructuredTestCases {
            functional: CaseGroup {
                happy: vec!["Verify A".into(), "Verify B".into()],
                alternative: vec![PLACEHOLDER.into()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_markup_structure_and_order() {
        let markup = to_markup(&sample());
        let lines: Vec<&str> = markup.lines().collect();

        assert_eq!(lines[0], "h2. Functional Test Cases");
        assert_eq!(lines[1], "*Happy Cases*");
        assert_eq!(lines[2], "- Verify A");
        assert_eq!(lines[3], "- Verify B");
        assert_eq!(lines[4], "*Alternative Cases*");
        assert_eq!(lines[5], PLACEHOLDER);
        assert_eq!(lines[6], "*Negative Cases*");
        assert_eq!(lines[8], "*Edge Cases*");
        assert_eq!(lines[10], "");
        assert_eq!(lines[11], "h2. Regression Test Cases");

        let non_functional = lines
            .iter()
            .position(|l| *l == "h2. Non-Functional Test Cases")
            .unwrap();
        assert!(non_functional > 11);
        assert_eq!(lines.last(), Some(&PLACEHOLDER));
    }

    #[test]
    fn test_markup_for_empty_cases_has_twelve_placeholders() {
        let markup = to_markup(&StructuredTestCases::default());
        assert_eq!(markup.matches(PLACEHOLDER).count(), 12);
        assert!(!markup.contains("- "));
    }

    #[test]
    fn test_adf_document_shape() {
        let doc = to_adf(&sample());
        assert_eq!(doc["type"], "doc");
        assert_eq!(doc["version"], 1);

        let content = doc["content"].as_array().unwrap();
        assert_eq!(content[0]["type"], "heading");
        assert_eq!(content[0]["content"][0]["text"], "Functional Test Cases");
        assert_eq!(content[1]["content"][0]["marks"][0]["type"], "strong");
        assert_eq!(content[2]["type"], "bulletList");
        assert_eq!(content[2]["content"].as_array().unwrap().len(), 2);
        assert_eq!(content[4]["content"][0]["marks"][0]["type"], "em");
        // 3 encabezados + 12 etiquetas + 12 bloques
        assert_eq!(content.len(), 27);
    }
}
