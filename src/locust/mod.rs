//! Locustfile assembly — wraps rendered task statements in a runnable
//! Locust scenario module.

use crate::core::error::Error;
use crate::core::task::Task;
use indexmap::IndexMap;
use std::fmt::Write;

/// Indentation of statements inside a generated task method.
const TASK_BODY_INDENT: usize = 8;

const FILE_HEADER: &str = "\
# File generated by enjambre. Review before pointing it at real traffic.
from locust import HttpUser, task, between
";

/// Render a full locustfile for the given task sequence.
///
/// Named global code blocks are emitted once each at module level, in
/// first-seen task order; each task becomes one `@task` method on a
/// single `HttpUser` subclass.
pub fn render_locustfile(tasks: &[Task]) -> Result<String, Error> {
    let mut out = String::from(FILE_HEADER);

    for lines in collect_global_code_blocks(tasks).values() {
        out.push('\n');
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push_str("\n\nclass GeneratedUser(HttpUser):\n    wait_time = between(1, 2)\n");

    for task in tasks {
        if task.statements.is_empty() {
            return Err(Error::EmptyTask(task.name.clone()));
        }
        out.push('\n');
        out.push_str("    @task\n");
        let _ = writeln!(out, "    def {}(self):", task.name);
        for statement in &task.statements {
            out.push_str(&statement.render(TASK_BODY_INDENT)?);
            out.push('\n');
        }
    }

    Ok(out)
}

/// First-seen-wins merge of every task's named code blocks.
fn collect_global_code_blocks(tasks: &[Task]) -> IndexMap<String, Vec<String>> {
    let mut blocks = IndexMap::new();
    for task in tasks {
        for (name, lines) in &task.global_code_blocks {
            blocks
                .entry(name.clone())
                .or_insert_with(|| lines.clone());
        }
    }
    blocks
}
