//! Built-in methods served by the binary, with their documentation.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::{
    context::RequestContext,
    dispatcher::{check_required_params, Dispatcher, ParamCheck},
    docs::{ApiDocs, MethodDoc, ParamDoc},
    errors::DispatchError,
    registry::{MethodResult, DEFAULT_TIER},
};

pub const INVALID_REPEAT: i64 = 100;
pub const MAX_REPEAT: u64 = 100;

pub fn register_builtin(dispatcher: &mut Dispatcher, docs: &mut ApiDocs) {
    dispatcher.register(DEFAULT_TIER, "ping", &[], ping);
    docs.add_docs(
        DEFAULT_TIER,
        "ping",
        MethodDoc::new("Liveness check, answered by {i}every{/i} version.")
            .example("json", r#"{"ok":true,"result":{"pong":true}}"#),
    );

    dispatcher.register("1.0", "echo", &["text"], echo);
    docs.add_docs(
        "1.0",
        "echo",
        MethodDoc::new("Returns {b}text{/b} unchanged.")
            .param(ParamDoc::new("text", "string", "Text to send back"))
            .example("json", r#"{"ok":true,"result":{"text":"hi"}}"#),
    );

    dispatcher.register("2.0", "echo", &["text"], echo_repeat);
    docs.add_docs(
        "2.0",
        "echo",
        MethodDoc::new("Returns {b}text{/b}, optionally repeated.")
            .param(ParamDoc::new("text", "string", "Text to send back"))
            .param(ParamDoc::new(
                "repeat",
                "integer",
                "{i}Optional.{/i} How many times to repeat, 1 to 100",
            ))
            .example("json", r#"{"ok":true,"result":{"text":"hihi"}}"#),
    );

    dispatcher.register("1.0", "time", &[], time);
    docs.add_docs(
        "1.0",
        "time",
        MethodDoc::new("Current server time in UTC.")
            .example("json", r#"{"ok":true,"result":{"utc":"2026-01-01T00:00:00.000Z"}}"#),
    );

    dispatcher.register("1.0", "greet", &["name"], greet);
    docs.add_docs(
        "1.0",
        "greet",
        MethodDoc::new("Greets {b}name{/b}. Formal greetings also need a title.")
            .param(ParamDoc::new("name", "string", "Who to greet"))
            .param(ParamDoc::new(
                "formal",
                "any",
                "{i}Optional.{/i} Switches to a formal greeting",
            ))
            .param(ParamDoc::new(
                "title",
                "string",
                "Required when {b}formal{/b} is present",
            ))
            .example("json", r#"{"ok":true,"result":{"greeting":"Hello, Ada!"}}"#),
    );
}

fn result(value: Value) -> MethodResult {
    match value {
        Value::Object(map) => Ok(map),
        other => Ok(Map::from_iter([("value".to_string(), other)])),
    }
}

fn ping(_ctx: &RequestContext) -> MethodResult {
    result(json!({ "pong": true }))
}

fn echo(ctx: &RequestContext) -> MethodResult {
    result(json!({ "text": ctx.get("text") }))
}

fn echo_repeat(ctx: &RequestContext) -> MethodResult {
    let text = ctx.text("text").unwrap_or_default();
    let repeat = match ctx.text("repeat") {
        None => 1,
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|count| (1..=MAX_REPEAT).contains(count))
            .ok_or_else(|| {
                DispatchError::application(INVALID_REPEAT, "repeat must be between 1 and 100")
                    .with_extra("repeat", raw.clone())
            })?,
    };

    result(json!({ "text": text.repeat(repeat as usize) }))
}

fn time(_ctx: &RequestContext) -> MethodResult {
    let now = Utc::now();
    result(json!({
        "utc": now.to_rfc3339_opts(SecondsFormat::Millis, true),
        "unix": now.timestamp(),
    }))
}

fn greet(ctx: &RequestContext) -> MethodResult {
    let name = ctx.text("name").unwrap_or_default();

    if !ctx.contains("formal") {
        return result(json!({ "greeting": format!("Hello, {name}!") }));
    }

    match check_required_params(&["title"], ctx, false)? {
        ParamCheck::Complete => {
            let title = ctx.text("title").unwrap_or_default();
            result(json!({ "greeting": format!("Good day, {title} {name}.") }))
        }
        ParamCheck::Missing(param) => Err(DispatchError::missing_param(param)),
    }
}
