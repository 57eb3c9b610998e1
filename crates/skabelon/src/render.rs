//! The render loop.
//!
//! Pulls instructions from a dispatcher one at a time and, for each, resolves
//! the template, renders it with the instruction's context and writes the
//! result. The first failure stops the loop; files written before it stay.

use std::fs;
use std::path::PathBuf;

use skabelon_dispatch::{Dispatch, DispatchOptions, RenderInstruction};
use skabelon_render::TemplateEngine;

use crate::error::SkabelonError;

/// What a completed run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Output files in the order they were written.
    pub written: Vec<PathBuf>,
}

/// Invokes the dispatcher once and renders every instruction it yields.
pub fn render_all<E, D>(
    engine: &E,
    dispatcher: &mut D,
    options: &DispatchOptions,
) -> Result<RenderSummary, SkabelonError>
where
    E: TemplateEngine + ?Sized,
    D: Dispatch + ?Sized,
{
    let mut summary = RenderSummary::default();

    for (index, instruction) in dispatcher.dispatch(options)?.enumerate() {
        let instruction = instruction?;
        tracing::debug!(
            index,
            template = %instruction.template,
            output = %instruction.output.display(),
            "render instruction"
        );
        let path = render_one(engine, &instruction)?;
        tracing::info!("wrote {}", path.display());
        summary.written.push(path);
    }

    Ok(summary)
}

/// Renders a single instruction and writes its output file.
///
/// The output file is only created once rendering has succeeded.
pub fn render_one<E>(engine: &E, instruction: &RenderInstruction) -> Result<PathBuf, SkabelonError>
where
    E: TemplateEngine + ?Sized,
{
    let text = engine
        .render_named(&instruction.template, &instruction.context_value())
        .map_err(|source| SkabelonError::Render {
            template: instruction.template.clone(),
            output: instruction.output.clone(),
            source,
        })?;

    fs::write(&instruction.output, text).map_err(|source| SkabelonError::Write {
        path: instruction.output.clone(),
        source,
    })?;

    Ok(instruction.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skabelon_dispatch::{DispatchError, FnDispatcher};
    use skabelon_render::{MiniJinjaEngine, RenderError};
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn engine() -> MiniJinjaEngine {
        let mut engine = MiniJinjaEngine::new();
        engine.add_template("t.tmpl", "Hello {{ name }}").unwrap();
        engine.add_template("list.tmpl", "{% for i in items %}{{ i }};{% endfor %}").unwrap();
        engine
    }

    fn instruction(template: &str, context: serde_json::Value, output: &Path) -> RenderInstruction {
        RenderInstruction::with_value(template, context, output)
    }

    #[test]
    fn test_single_instruction() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        let target = out.clone();
        let mut dispatcher = FnDispatcher::new(move |_: &DispatchOptions| {
            Ok(vec![instruction("t.tmpl", json!({"name": "World"}), &target)])
        });

        let summary = render_all(&engine(), &mut dispatcher, &DispatchOptions::new()).unwrap();

        assert_eq!(summary.written, vec![out.clone()]);
        assert_eq!(fs::read_to_string(out).unwrap(), "Hello World");
    }

    #[test]
    fn test_zero_instructions() {
        let mut dispatcher =
            FnDispatcher::new(|_: &DispatchOptions| Ok(Vec::<RenderInstruction>::new()));

        let summary = render_all(&engine(), &mut dispatcher, &DispatchOptions::new()).unwrap();
        assert!(summary.written.is_empty());
    }

    #[test]
    fn test_options_reach_dispatcher() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        let target = out.clone();
        let mut dispatcher = FnDispatcher::new(move |options: &DispatchOptions| {
            let name = options.get("name").unwrap_or_default().to_string();
            Ok(vec![instruction("t.tmpl", json!({ "name": name }), &target)])
        });
        let options = DispatchOptions::from_tokens(["name:a:b"]).unwrap();

        render_all(&engine(), &mut dispatcher, &options).unwrap();
        assert_eq!(fs::read_to_string(out).unwrap(), "Hello a:b");
    }

    #[test]
    fn test_instructions_processed_in_order() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("same.txt");
        let target = out.clone();
        let mut dispatcher = FnDispatcher::new(move |_: &DispatchOptions| {
            Ok(vec![
                instruction("t.tmpl", json!({"name": "first"}), &target),
                instruction("list.tmpl", json!({"items": [1, 2]}), &target),
            ])
        });

        let summary = render_all(&engine(), &mut dispatcher, &DispatchOptions::new()).unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(fs::read_to_string(out).unwrap(), "1;2;");
    }

    #[test]
    fn test_missing_template_stops_the_loop() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let pulled = Rc::new(Cell::new(0));
        let counter = pulled.clone();
        let mut dispatcher = FnDispatcher::new(move |_: &DispatchOptions| {
            let root = root.clone();
            let counter = counter.clone();
            Ok(["t.tmpl", "missing.tmpl", "t.tmpl"]
                .into_iter()
                .enumerate()
                .map(move |(i, name)| {
                    counter.set(counter.get() + 1);
                    instruction(name, json!({"name": i}), &root.join(format!("{i}.txt")))
                }))
        });

        let err = render_all(&engine(), &mut dispatcher, &DispatchOptions::new()).unwrap_err();

        assert!(matches!(
            err.render_error(),
            Some(RenderError::TemplateNotFound(_))
        ));
        assert_eq!(pulled.get(), 2);
        assert!(dir.path().join("0.txt").exists());
        assert!(!dir.path().join("1.txt").exists());
        assert!(!dir.path().join("2.txt").exists());
    }

    #[test]
    fn test_render_error_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        let target = out.clone();
        let mut dispatcher = FnDispatcher::new(move |_: &DispatchOptions| {
            Ok(vec![instruction("t.tmpl", json!({}), &target)])
        });

        let err = render_all(&engine(), &mut dispatcher, &DispatchOptions::new()).unwrap_err();

        assert!(matches!(
            err.render_error(),
            Some(RenderError::TemplateError(_))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_parent_directory_is_write_error() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("no/such/dir/out.txt");
        let target = out.clone();
        let mut dispatcher = FnDispatcher::new(move |_: &DispatchOptions| {
            Ok(vec![instruction("t.tmpl", json!({"name": "x"}), &target)])
        });

        let err = render_all(&engine(), &mut dispatcher, &DispatchOptions::new()).unwrap_err();
        assert!(matches!(err, SkabelonError::Write { ref path, .. } if *path == out));
    }

    #[test]
    fn test_existing_output_is_truncated() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.txt");
        fs::write(&out, "a much longer previous content").unwrap();

        let written = render_one(&engine(), &instruction("t.tmpl", json!({"name": "W"}), &out)).unwrap();
        assert_eq!(written, out);
        assert_eq!(fs::read_to_string(&out).unwrap(), "Hello W");
    }

    #[test]
    fn test_dispatch_failure_propagates() {
        let mut dispatcher = FnDispatcher::new(|_: &DispatchOptions| {
            Err::<Vec<RenderInstruction>, _>(DispatchError::other("cannot dispatch"))
        });

        let err = render_all(&engine(), &mut dispatcher, &DispatchOptions::new()).unwrap_err();
        assert!(matches!(err, SkabelonError::Dispatch(DispatchError::Other(_))));
        assert_eq!(err.to_string(), "cannot dispatch");
    }
}
