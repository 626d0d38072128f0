//! Late-bound task parameters and the argument templates that read them.

use std::path::Path;

use meadow_config::CommandDef;
use meadow_task::{Annotation, Annotations, ArgsError, TaskSpec};
use minijinja::{Environment, UndefinedBehavior, Value, context};

/// Name of the package to build and upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageName(pub String);

impl Annotation for PackageName {
  const KIND: &'static str = "package-name";
}

/// Uploaded package and the collection to publish it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
  pub package_id: String,
  pub collection_id: String,
}

impl Annotation for PublishTarget {
  const KIND: &'static str = "publish-target";
}

/// Which annotation a task's argument templates are rendered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplateContext {
  /// No variables; templates must be literal.
  Empty,
  /// `package_name`
  Package,
  /// `package_id`, `collection_id`
  Publish,
}

/// Build a task template whose arguments are rendered at start time.
pub(crate) fn task_spec(
  name: &str,
  command: &CommandDef,
  working_dir: &Path,
  context: TemplateContext,
) -> TaskSpec {
  let templates = command.args.clone();
  TaskSpec::new(name, command.program.clone(), working_dir).with_args_builder(move |annotations| {
    let values = template_values(context, annotations)?;
    render_args(&templates, values)
  })
}

fn template_values(context: TemplateContext, annotations: &Annotations) -> Result<Value, ArgsError> {
  Ok(match context {
    TemplateContext::Empty => context! {},
    TemplateContext::Package => {
      let PackageName(name) = annotations.require::<PackageName>()?;
      context! { package_name => name.as_str() }
    }
    TemplateContext::Publish => {
      let target = annotations.require::<PublishTarget>()?;
      context! {
        package_id => target.package_id.as_str(),
        collection_id => target.collection_id.as_str(),
      }
    }
  })
}

/// Render every template; an unknown variable is an error.
fn render_args(templates: &[String], values: Value) -> Result<Vec<String>, ArgsError> {
  let mut env = Environment::new();
  env.set_undefined_behavior(UndefinedBehavior::Strict);

  templates
    .iter()
    .map(|template| {
      env
        .render_str(template, values.clone())
        .map_err(|e| ArgsError::Template {
          template: template.clone(),
          message: e.to_string(),
        })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn command(args: &[&str]) -> CommandDef {
    CommandDef::new("dotnet", args.iter().copied())
  }

  #[test]
  fn test_package_name_rendered() {
    let mut annotations = Annotations::new();
    annotations.attach(PackageName("demo".to_string()));

    let values = template_values(TemplateContext::Package, &annotations).unwrap();
    let args = render_args(
      &command(&["package", "create", "--name", "{{ package_name }}"]).args,
      values,
    )
    .unwrap();

    assert_eq!(args, vec!["package", "create", "--name", "demo"]);
  }

  #[test]
  fn test_missing_annotation_fails_fast() {
    let err = template_values(TemplateContext::Publish, &Annotations::new()).unwrap_err();
    assert!(matches!(err, ArgsError::MissingAnnotation { kind: "publish-target" }));
  }

  #[test]
  fn test_undefined_variable_is_error() {
    let err = render_args(&["{{ package_id }}".to_string()], context! {}).unwrap_err();
    assert!(matches!(err, ArgsError::Template { .. }));
  }

  #[test]
  fn test_literal_args_unchanged() {
    let args = render_args(
      &command(&["tool", "run", "meadow", "login"]).args,
      context! {},
    )
    .unwrap();
    assert_eq!(args, vec!["tool", "run", "meadow", "login"]);
  }

  #[test]
  fn test_publish_target_rendered() {
    let mut annotations = Annotations::new();
    annotations.attach(PublishTarget {
      package_id: "abc-123".to_string(),
      collection_id: "4f2a".to_string(),
    });

    let values = template_values(TemplateContext::Publish, &annotations).unwrap();
    let args = render_args(
      &command(&["publish", "{{ package_id }}", "--collectionId", "{{ collection_id }}"]).args,
      values,
    )
    .unwrap();

    assert_eq!(args, vec!["publish", "abc-123", "--collectionId", "4f2a"]);
  }
}
