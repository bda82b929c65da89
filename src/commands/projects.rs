use colored::*;

/// Muestra los proyectos configurados
pub fn list_projects(projects: &[String]) {
    if projects.is_empty() {
        println!("{}", "No hay proyectos configurados.".yellow());
        return;
    }

    println!("{}", "Proyectos disponibles:".green());
    for (i, project) in projects.iter().enumerate() {
        println!("{}: {}", i + 1, project);
    }
}
