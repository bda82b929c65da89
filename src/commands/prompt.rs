use colored::*;

use crate::utils::{INSTRUCTION_TEMPLATE, TRANSFORM_TEMPLATE};

/// Muestra la plantilla de instrucciones (o la de transformación)
pub fn show_prompt(transform: bool) {
    let (title, template) = if transform {
        ("Plantilla de transformación:", TRANSFORM_TEMPLATE)
    } else {
        ("Plantilla de instrucciones:", INSTRUCTION_TEMPLATE)
    };

    println!("{}", title.green());
    println!("{}", template);
}
