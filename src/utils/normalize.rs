use serde::de::Error as _;
use serde_json::Value;

use crate::error::NormalizeError;
use crate::models::StructuredTestCases;

/// Quita un único envoltorio de bloque de código (```json ... ``` o ``` ... ```)
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let inner = if trimmed.starts_with("```json") && trimmed.ends_with("```") && trimmed.len() >= 10 {
        &trimmed[7..trimmed.len() - 3]
    } else if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6 {
        &trimmed[3..trimmed.len() - 3]
    } else {
        trimmed
    };

    inner.trim()
}

/// Convierte la respuesta cruda del modelo en casos de prueba estructurados.
///
/// Distingue JSON mal formado de una forma incorrecta; no repara objetos incompletos.
pub fn normalize(raw: &str) -> Result<StructuredTestCases, NormalizeError> {
    if raw.trim().is_empty() {
        return Err(NormalizeError::Empty);
    }

    let cleaned = strip_code_fence(raw);
    let value: Value = serde_json::from_str(cleaned).map_err(NormalizeError::MalformedJson)?;

    require_objects(&value).map_err(NormalizeError::InvalidShape)?;
    serde_json::from_value(value).map_err(NormalizeError::InvalidShape)
}

const SECTION_KEYS: [&str; 6] = [
    "functionalTestCases",
    "functional",
    "regressionTestCases",
    "regression",
    "nonFunctionalTestCases",
    "nonFunctional",
];

/// serde también acepta secuencias para structs; aquí solo valen objetos
fn require_objects(value: &Value) -> Result<(), serde_json::Error> {
    let Some(sections) = value.as_object() else {
        return Err(serde_json::Error::custom("se esperaba un objeto en el nivel superior"));
    };

    for key in SECTION_KEYS {
        if let Some(section) = sections.get(key) {
            if !section.is_object() {
                return Err(serde_json::Error::custom(format!(
                    "la sección {} debe ser un objeto",
                    key
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Section, SubCategory};

    const FULL: &str = r#"{
        "functionalTestCases": {
            "happyCases": ["Verify login succeeds"],
            "alternativeCases": [],
            "negativeCases": ["Verify wrong password is rejected"],
            "edgeCases": []
        },
        "regressionTestCases": {
            "happyCases": [], "alternativeCases": [], "negativeCases": [], "edgeCases": []
        },
        "nonFunctionalTestCases": {
            "happyCases": [], "alternativeCases": [], "negativeCases": [], "edgeCases": []
        }
    }"#;

    #[test]
    fn test_normalize_plain_object() {
        let cases = normalize(FULL).unwrap();
        assert_eq!(cases.objective_count(), 2);
        assert_eq!(
            cases.group(Section::Functional).cases(SubCategory::Negative),
            ["Verify wrong password is rejected".to_string()]
        );
    }

    #[test]
    fn test_fenced_and_plain_are_identical() {
        let fenced = format!("```json\n{}\n```", FULL);
        let bare_fence = format!("```\n{}\n```", FULL);
        let plain = normalize(FULL).unwrap();
        assert_eq!(normalize(&fenced).unwrap(), plain);
        assert_eq!(normalize(&bare_fence).unwrap(), plain);
    }

    #[test]
    fn test_accepts_all_leaves_empty() {
        let json = serde_json::to_string(&StructuredTestCases::default()).unwrap();
        let cases = normalize(&json).unwrap();
        assert_eq!(cases.objective_count(), 0);
    }

    #[test]
    fn test_accepts_short_key_aliases() {
        let json = r#"{
            "functional": {"happy": ["a"], "alternative": [], "negative": [], "edge": []},
            "regression": {"happy": [], "alternative": [], "negative": [], "edge": []},
            "nonFunctional": {"happy": [], "alternative": [], "negative": [], "edge": ["b"]}
        }"#;
        let cases = normalize(json).unwrap();
        assert_eq!(cases.objective_count(), 2);
    }

    #[test]
    fn test_rejects_each_missing_leaf() {
        let sections = ["functionalTestCases", "regressionTestCases", "nonFunctionalTestCases"];
        let leaves = ["happyCases", "alternativeCases", "negativeCases", "edgeCases"];

        for section in sections {
            for leaf in leaves {
                let mut value = serde_json::to_value(StructuredTestCases::default()).unwrap();
                value[section].as_object_mut().unwrap().remove(leaf);
                let text = value.to_string();
                assert!(
                    matches!(normalize(&text), Err(NormalizeError::InvalidShape(_))),
                    "debería rechazar la falta de {}.{}",
                    section,
                    leaf
                );
            }
        }
    }

    #[test]
    fn test_rejects_missing_section() {
        let mut value = serde_json::to_value(StructuredTestCases::default()).unwrap();
        value.as_object_mut().unwrap().remove("regressionTestCases");
        assert!(matches!(
            normalize(&value.to_string()),
            Err(NormalizeError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_leaf_type() {
        let mut value = serde_json::to_value(StructuredTestCases::default()).unwrap();
        value["functionalTestCases"]["edgeCases"] = Value::String("none".into());
        assert!(matches!(
            normalize(&value.to_string()),
            Err(NormalizeError::InvalidShape(_))
        ));

        value["functionalTestCases"]["edgeCases"] = serde_json::json!([1, 2]);
        assert!(matches!(
            normalize(&value.to_string()),
            Err(NormalizeError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_rejects_array_at_top_level() {
        assert!(matches!(
            normalize("[[\"a\"]]"),
            Err(NormalizeError::InvalidShape(_))
        ));
        // Misma aridad que el esquema, pero en forma de secuencia
        assert!(matches!(
            normalize("[[[],[],[],[]],[[],[],[],[]],[[],[],[],[]]]"),
            Err(NormalizeError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_rejects_section_written_as_array() {
        let mut value = serde_json::to_value(StructuredTestCases::default()).unwrap();
        value["functionalTestCases"] = serde_json::json!([["Verify a"], [], [], []]);
        assert!(matches!(
            normalize(&value.to_string()),
            Err(NormalizeError::InvalidShape(_))
        ));

        let aliased = r#"{
            "functional": [[], [], [], []],
            "regression": {"happy": [], "alternative": [], "negative": [], "edge": []},
            "nonFunctional": {"happy": [], "alternative": [], "negative": [], "edge": []}
        }"#;
        assert!(matches!(normalize(aliased), Err(NormalizeError::InvalidShape(_))));
    }

    #[test]
    fn test_malformed_json_is_distinct() {
        assert!(matches!(
            normalize("```json\n{\"functionalTestCases\": \n```"),
            Err(NormalizeError::MalformedJson(_))
        ));
        assert!(matches!(
            normalize("Here are your tests!"),
            Err(NormalizeError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_rejects_blank_input() {
        assert!(matches!(normalize(""), Err(NormalizeError::Empty)));
        assert!(matches!(normalize("  \n\t"), Err(NormalizeError::Empty)));
    }

    #[test]
    fn test_strip_code_fence_only_exact_wrapper() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("[1]"), "[1]");
        // Un bloque en medio del texto no se toca
        assert_eq!(strip_code_fence("texto ```json [1] ```"), "texto ```json [1] ```");
    }
}
