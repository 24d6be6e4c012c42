use tera::{Context, Tera};

use crate::bindings::VariableBindings;

pub fn build_context(bindings: &VariableBindings) -> Context {
    let mut context = Context::new();
    for (key, value) in bindings.iter() {
        context.insert(key, value);
    }
    context
}

/// Evaluate a Tera boolean expression against the bindings.
///
/// Returns `Ok(true)` if the expression evaluates to true, `Ok(false)` otherwise.
/// Returns `Err` if the expression fails to parse or render.
pub fn eval_bool_expr(expr: &str, bindings: &VariableBindings) -> Result<bool, tera::Error> {
    let template_str = format!("{{% if {expr} %}}true{{% else %}}false{{% endif %}}");
    let result = Tera::one_off(&template_str, &build_context(bindings), false)?;
    Ok(result.trim() == "true")
}

/// Render a computed-variable template against the bindings.
pub fn eval_computed(template: &str, bindings: &VariableBindings) -> Result<String, tera::Error> {
    Tera::one_off(template, &build_context(bindings), false)
}
