use std::path::Path;

use base64::{engine::general_purpose::STANDARD as Base64Engine, Engine as _};
use serde_json::{json, Value};

use crate::model::choice::ModelChoice;
use crate::model::notice::NoticeLevel;
use crate::services::session::{RunReport, Session};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn warning(id: Value, message: impl Into<String>, payload: Value) -> String {
    json!({
        "id": id,
        "status": "warning",
        "message": message.into(),
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn err_with(id: Value, message: impl Into<String>, payload: Value) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into(),
        "payload": payload
    })
    .to_string()
}

fn models_payload(session: &Session) -> Value {
    let models: Vec<Value> = ModelChoice::ALL
        .iter()
        .map(|&c| {
            json!({
                "key": c,
                "label": c.label(),
                "model": c.model_id(session.config()),
            })
        })
        .collect();

    json!({ "models": models, "default": ModelChoice::default() })
}

fn render_report(id: Value, report: RunReport) -> String {
    let last_message = report
        .notices
        .last()
        .map(|n| n.message.clone())
        .unwrap_or_default();

    match report.outcome() {
        NoticeLevel::Warning => warning(id, last_message, json!({ "notices": report.notices })),
        NoticeLevel::Error => err_with(id, last_message, json!({ "notices": report.notices })),
        _ => {
            let artifacts: Vec<Value> = report
                .artifacts
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let mut v = json!({
                        "file_name": a.file_name,
                        "mime_type": a.mime_type,
                        "size": a.bytes.len(),
                        "data": Base64Engine.encode(&a.bytes),
                    });
                    if let Some(path) = report.written.get(i) {
                        v["path"] = json!(path.display().to_string());
                    }
                    v
                })
                .collect();

            let (sentences, glossary) = match &report.run {
                Some(run) => (json!(run.tables.sentences.rows), json!(run.tables.glossary.rows)),
                None => (json!([]), json!([])),
            };

            ok(
                id,
                json!({
                    "sentences": sentences,
                    "glossary": glossary,
                    "notices": report.notices,
                    "artifacts": artifacts,
                }),
            )
        }
    }
}

pub fn handle(session: &Session, input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "huayu-core alive" })),

        Command::ModelsList => ok(id, models_payload(session)),

        Command::Analyze => {
            let text = get_str(payload, "text");
            let choice = match get_str(payload, "model").parse::<ModelChoice>() {
                Ok(c) => c,
                Err(e) => return err(id, e),
            };
            let output_dir = get_str(payload, "output_dir");
            let output_dir = (!output_dir.is_empty()).then(|| Path::new(output_dir));

            let report = session.analyze(text, choice, output_dir);
            render_report(id, report)
        }

        Command::Unknown => err(id, "unknown command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::services::analyzer::tests::{ScriptedBackend, HELLO, THANKS};

    fn session(replies: Vec<Result<&str, &str>>) -> Session {
        Session::new(AppConfig::default(), Box::new(ScriptedBackend::new(replies)))
    }

    fn call(s: &Session, req: Value) -> Value {
        serde_json::from_str(&handle(s, &req.to_string())).unwrap()
    }

    #[test]
    fn ping_and_unknown() {
        let s = session(vec![]);
        let v = call(&s, json!({ "id": 1, "cmd": "ping" }));
        assert_eq!(v["status"], "ok");
        assert_eq!(v["id"], 1);

        let v = call(&s, json!({ "id": 2, "cmd": "project.open" }));
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "unknown command");

        for cmd in ["input.load", "encoding.detect"] {
            let v = call(&s, json!({ "cmd": cmd, "payload": { "path": "a.txt" } }));
            assert_eq!(v["message"], "unknown command");
        }

        let raw: Value = serde_json::from_str(&handle(&s, "not json")).unwrap();
        assert_eq!(raw["message"], "invalid json");
    }

    #[test]
    fn models_list_exposes_default() {
        let s = session(vec![]);
        let v = call(&s, json!({ "cmd": "models.list" }));
        assert_eq!(v["payload"]["default"], "primary");
        assert_eq!(v["payload"]["models"][0]["label"], "GPT-4");
        assert_eq!(v["payload"]["models"][1]["model"], "gpt-3.5-turbo");
    }

    #[test]
    fn analyze_returns_rows_and_artifacts() {
        let s = session(vec![Ok(HELLO), Ok(THANKS)]);
        let v = call(
            &s,
            json!({ "id": "a", "cmd": "analyze", "payload": { "text": "你好\n謝謝", "model": "primary" } }),
        );

        assert_eq!(v["status"], "ok");
        let p = &v["payload"];
        assert_eq!(p["sentences"].as_array().unwrap().len(), 2);
        assert_eq!(p["sentences"][0][0], "你好");
        assert_eq!(p["glossary"][1][0], "謝謝");

        let artifacts = p["artifacts"].as_array().unwrap();
        assert_eq!(artifacts.len(), 3);
        assert_eq!(artifacts[1]["file_name"], "taiwanese_sentences.csv");

        let csv = Base64Engine
            .decode(artifacts[1]["data"].as_str().unwrap())
            .unwrap();
        assert_eq!(csv.len() as u64, artifacts[1]["size"].as_u64().unwrap());
        assert!(csv.starts_with(&[0xEF, 0xBB, 0xBF]));
        assert!(artifacts[0].get("path").is_none());
    }

    #[test]
    fn analyze_failure_is_one_error_without_artifacts() {
        let s = session(vec![Ok("sorry, error")]);
        let v = call(&s, json!({ "cmd": "analyze", "payload": { "text": "你好" } }));

        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().starts_with("エラーが発生しました: "));
        let notices = v["payload"]["notices"].as_array().unwrap();
        assert_eq!(notices.iter().filter(|n| n["level"] == "error").count(), 1);
        assert!(v["payload"].get("artifacts").is_none());
    }

    #[test]
    fn analyze_empty_text_warns() {
        let s = session(vec![]);
        let v = call(&s, json!({ "cmd": "analyze", "payload": { "text": "   " } }));
        assert_eq!(v["status"], "warning");
        assert_eq!(v["message"], "文章を入力してください");
    }

    #[test]
    fn analyze_rejects_unknown_model() {
        let s = session(vec![]);
        let v = call(&s, json!({ "cmd": "analyze", "payload": { "text": "你好", "model": "llama" } }));
        assert_eq!(v["status"], "error");
        assert!(v["message"].as_str().unwrap().contains("llama"));
    }
}
