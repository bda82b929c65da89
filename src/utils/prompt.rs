pub const DESCRIPTION_TOKEN: &str = "${description}";
pub const TEST_CASES_TOKEN: &str = "${testCases}";

/// Plantilla de la primera llamada: casos de prueba estructurados en JSON
pub const INSTRUCTION_TEMPLATE: &str = r#"You are a senior QA engineer. Using ONLY the Jira ticket information below, write test objectives grouped into Functional, Regression and Non-Functional tests, each split into Happy, Alternative, Negative and Edge cases.

**Rules:**
* Reply with ONE valid JSON object and nothing else: no introduction, no explanation, no markdown fences. The reply starts with `{` and ends with `}`.
* Use only what the ticket says. Do not invent requirements or rely on outside knowledge.
* Every key shown below MUST be present, spelled exactly as shown (camelCase).
* When no test can be derived for a sub-category, its array MUST contain exactly one string: "_No specific tests derivable from the description for this sub-category._" Never omit the key.

**Output structure:**
{
  "functionalTestCases": {
    "happyCases": [], "alternativeCases": [], "negativeCases": [], "edgeCases": []
  },
  "regressionTestCases": {
    "happyCases": [], "alternativeCases": [], "negativeCases": [], "edgeCases": []
  },
  "nonFunctionalTestCases": {
    "happyCases": [], "alternativeCases": [], "negativeCases": [], "edgeCases": []
  }
}

**Functional:** verify the new or changed behaviour described in the ticket: main success paths (happy), valid variations (alternative), invalid input and expected errors (negative), boundaries and unusual conditions (edge).

**Regression:** verify that existing behaviour around the change still works: related modules, shared components and data the ticket mentions or clearly implies. Do not repeat the functional tests.

**Non-Functional:** performance, security, usability and reliability, only when the ticket mentions or clearly implies them. Otherwise use the placeholder in every sub-category.

**Objective format:** one concise string per objective, ideally "Verify [action or condition] results in [expected outcome]."

**About the ticket text:** it may contain Jira markup such as `!image.png!` or `{color:red}`. Ignore the markup and read only the text.

**Jira Ticket Information:**

${description}

Before answering, check that the reply is only the JSON object above with all twelve arrays present."#;

/// Plantilla de la segunda llamada: una fila detallada por objetivo de prueba
pub const TRANSFORM_TEMPLATE: &str = r#"You are a QA engineer acting as a data transformation tool. Convert the test case summaries in the JSON object below into a flat JSON array of arrays, using ONLY the two inputs provided.

**One-to-one mapping (mandatory):**
* Walk the input in this exact order: functionalTestCases, regressionTestCases, nonFunctionalTestCases; inside each one happyCases, alternativeCases, negativeCases, edgeCases; inside each array, from first to last.
* Every summary string produces exactly ONE inner array, except the placeholder "_No specific tests derivable from the description for this sub-category._", which produces nothing.
* Never merge, split, skip or add rows. The number of inner arrays MUST equal the number of non-placeholder summaries.

**Fields of each inner array, in this order (15 fields):**
1. Test Case ID: short prefix from the feature name (for example "TC-LOGIN-") followed by a counter starting at 001, zero padded to three digits. Use "TC-" when no prefix fits.
2. Feature: main feature name taken from the description.
3. User Story ID: story reference found in the description, otherwise "".
4. Description/Summary: the summary string itself. Grammar fixes are allowed, meaning changes are not. Never blank.
5. Type: "Functional", "Regression" or "Non-Functional", from the top-level key.
6. Category: "Happy Case", "Alternative Case", "Negative Case" or "Edge Case", from the second-level key.
7. Priority: "High", "Medium" or "Low". Default "Medium".
8. As (Actor): user role from the context. Default "User".
9. Given (Precondition): use "\n" between lines.
10. When (Steps): use "\n" between lines.
11. Then (Expected Result): use "\n" between lines.
12. Result (latest): always "".
13. Est (mins): integer. Default 5.
14. Date Run: always "".
15. Notes: always "".

**Output:** only the JSON array of arrays, correctly escaped, with Est (mins) as a JSON integer. No comments, no explanations, no markdown fences.

---

**1. Feature Description:**
```
${description}
```

**2. Test Case Summaries (JSON object):**
```json
${testCases}
```

---

**Output (JSON array of arrays only):**
"#;

/// Sustituye la primera aparición de cada marcador, en el orden dado.
///
/// El valor se inserta tal cual, sin escapar.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |text, &(token, value)| {
            text.replacen(token, value, 1)
        })
}

/// Prompt de la primera llamada, con la plantilla propia del usuario si la hay
pub fn instruction_prompt(description: &str, custom_template: Option<&str>) -> String {
    match custom_template.map(str::trim).filter(|t| !t.is_empty()) {
        Some(template) if template.contains(DESCRIPTION_TOKEN) => {
            fill_template(template, &[(DESCRIPTION_TOKEN, description)])
        }
        Some(template) => format!("{}\n\n**Jira Ticket Information:**\n\n{}", template, description),
        None => fill_template(INSTRUCTION_TEMPLATE, &[(DESCRIPTION_TOKEN, description)]),
    }
}

/// Prompt de la segunda llamada a partir del JSON de casos estructurados
pub fn transform_prompt(description: &str, test_cases_json: &str) -> String {
    fill_template(
        TRANSFORM_TEMPLATE,
        &[
            (DESCRIPTION_TOKEN, description),
            (TEST_CASES_TOKEN, test_cases_json),
        ],
    )
}
