//! Batch rewrite and generation client tests.
//!
//! The batch runs against an in-memory fake service; the HTTP client runs
//! against a small axum server standing in for Ollama.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::time::Duration;

use prompt_library::generation::{
    ChatRequest, GenerationError, GenerationService, OllamaClient,
};
use prompt_library::rewrite::{self, BatchEvent, BatchOptions, DocumentOutcome, SkipReason};

const CHATTY_REPLY: &str = "Here is the rewritten system prompt:\n\n```markdown\n# Rewritten\nThe user will provide text.\n```\n\nI hope this helps!";

/// Records every prompt; fails any prompt containing `FAIL`.
#[derive(Default)]
struct FakeService {
    prompts: RefCell<Vec<String>>,
}

impl GenerationService for FakeService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        if prompt.contains("FAIL") {
            return Err(GenerationError::Status {
                status: 500,
                body: "model crashed".to_string(),
            });
        }
        Ok(CHATTY_REPLY.to_string())
    }
}

/// Always answers with the same reply.
struct FixedReply(&'static str);

impl GenerationService for FixedReply {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

fn write(path: &Path, content: &str) {
    fs::write(path, content).expect("Failed to write file");
}

fn no_delay() -> BatchOptions {
    BatchOptions {
        delay: Duration::ZERO,
    }
}

mod run_batch {
    use super::*;

    #[tokio::test]
    async fn rewrites_documents_in_place_with_cleaned_text() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("tone--formal.md"), "# Formal\nBe formal.");
        let service = FakeService::default();

        let documents = rewrite::discover(dir.path()).expect("Discover failed");
        let report = rewrite::run_batch(&documents, &service, &no_delay(), |_| {}).await;

        assert_eq!(report.updated, 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("tone--formal.md")).expect("Read failed"),
            "# Rewritten\nThe user will provide text."
        );
        let prompts = service.prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("```\n# Formal\nBe formal.\n```"));
    }

    #[tokio::test]
    async fn never_sends_readme_or_blank_files() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("README.md"), "# About this library");
        write(&dir.path().join("grammar--readme-notes.md"), "notes");
        write(&dir.path().join("tone--blank.md"), "  \n\t\n");
        let service = FakeService::default();

        let documents = rewrite::discover(dir.path()).expect("Discover failed");
        let mut outcomes = Vec::new();
        let report = rewrite::run_batch(&documents, &service, &no_delay(), |event| {
            if let BatchEvent::Finished { name, outcome, .. } = event {
                outcomes.push((name.to_string(), (*outcome).clone()));
            }
        })
        .await;

        assert_eq!(report.skipped, 3);
        assert_eq!(report.updated, 0);
        assert!(service.prompts.borrow().is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("README.md")).expect("Read failed"),
            "# About this library"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("tone--blank.md")).expect("Read failed"),
            "  \n\t\n"
        );
        assert!(outcomes.contains(&(
            "README.md".to_string(),
            DocumentOutcome::Skipped(SkipReason::Readme)
        )));
        assert!(outcomes.contains(&(
            "tone--blank.md".to_string(),
            DocumentOutcome::Skipped(SkipReason::Empty)
        )));
    }

    #[tokio::test]
    async fn records_failures_and_keeps_going() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("a--broken.md"), "FAIL please");
        write(&dir.path().join("b--fine.md"), "# Fine");
        let service = FakeService::default();

        let documents = rewrite::discover(dir.path()).expect("Discover failed");
        let report = rewrite::run_batch(&documents, &service, &no_delay(), |_| {}).await;

        assert_eq!(report.total, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "a--broken.md");
        assert!(report.failures[0].detail.contains("model crashed"));
        assert_eq!(
            fs::read_to_string(dir.path().join("a--broken.md")).expect("Read failed"),
            "FAIL please"
        );
    }

    #[tokio::test]
    async fn reports_unreadable_documents_as_failures() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("binary.md"), [0xff, 0xfe, 0x00]).expect("Failed to write");
        let service = FakeService::default();

        let documents = rewrite::discover(dir.path()).expect("Discover failed");
        let report = rewrite::run_batch(&documents, &service, &no_delay(), |_| {}).await;

        assert_eq!(report.failures.len(), 1);
        assert!(service.prompts.borrow().is_empty());
    }

    #[tokio::test]
    async fn visits_documents_in_name_order() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("c.md"), "c");
        write(&dir.path().join("a.md"), "a");
        write(&dir.path().join("b.txt"), "not a prompt");
        write(&dir.path().join("b.md"), "b");

        let documents = rewrite::discover(dir.path()).expect("Discover failed");
        let mut order = Vec::new();
        rewrite::run_batch(&documents, &FakeService::default(), &no_delay(), |event| {
            if let BatchEvent::Finished { index, total, name, .. } = event {
                order.push((*index, *total, name.to_string()));
            }
        })
        .await;

        assert_eq!(
            order,
            vec![
                (1, 3, "a.md".to_string()),
                (2, 3, "b.md".to_string()),
                (3, 3, "c.md".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn keeps_the_file_when_cleanup_leaves_nothing() {
        for reply in ["Here is the rewritten system prompt:\n", "```markdown\n\n```"] {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            write(&dir.path().join("tone--formal.md"), "# Formal\nBe formal.");

            let documents = rewrite::discover(dir.path()).expect("Discover failed");
            let report =
                rewrite::run_batch(&documents, &FixedReply(reply), &no_delay(), |_| {}).await;

            assert_eq!(report.updated, 0, "reply {:?}", reply);
            assert_eq!(report.failures.len(), 1, "reply {:?}", reply);
            assert!(report.failures[0].detail.contains("no prompt body"));
            assert_eq!(
                fs::read_to_string(dir.path().join("tone--formal.md")).expect("Read failed"),
                "# Formal\nBe formal."
            );
        }
    }

    #[tokio::test]
    async fn announces_each_document_before_calling_the_service() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("a.md"), "a");
        write(&dir.path().join("b.md"), "b");
        let service = FakeService::default();

        let documents = rewrite::discover(dir.path()).expect("Discover failed");
        let mut events = Vec::new();
        rewrite::run_batch(&documents, &service, &no_delay(), |event| {
            let calls = service.prompts.borrow().len();
            match event {
                BatchEvent::Started { index, name, .. } => {
                    events.push(format!("start {} {} calls={}", index, name, calls))
                }
                BatchEvent::Finished { index, name, .. } => {
                    events.push(format!("finish {} {} calls={}", index, name, calls))
                }
            }
        })
        .await;

        assert_eq!(
            events,
            vec![
                "start 1 a.md calls=0",
                "finish 1 a.md calls=1",
                "start 2 b.md calls=1",
                "finish 2 b.md calls=2",
            ]
        );
    }

    #[tokio::test]
    async fn rerunning_on_clean_output_is_stable() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("x.md"), "# X");
        let documents = rewrite::discover(dir.path()).expect("Discover failed");

        rewrite::run_batch(&documents, &FakeService::default(), &no_delay(), |_| {}).await;
        let first = fs::read_to_string(dir.path().join("x.md")).expect("Read failed");
        rewrite::run_batch(&documents, &FakeService::default(), &no_delay(), |_| {}).await;
        let second = fs::read_to_string(dir.path().join("x.md")).expect("Read failed");

        assert_eq!(first, second);
    }
}

mod ollama_client {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("No local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn sends_a_single_user_message_and_returns_the_reply() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(req): Json<ChatRequest>| async move {
                Json(serde_json::json!({
                    "model": req.model,
                    "message": {
                        "role": "assistant",
                        "content": format!(
                            "{}|{}|{}|{}",
                            req.messages.len(),
                            req.messages[0].role,
                            req.stream,
                            req.messages[0].content
                        )
                    },
                    "done": true
                }))
            }),
        );
        let host = spawn(app).await;
        let client = OllamaClient::new(host, "llama3.2", Some(Duration::from_secs(5)))
            .expect("Failed to build client");

        let reply = client.generate("rewrite me").await.expect("Request failed");

        assert_eq!(reply, "1|user|false|rewrite me");
    }

    #[tokio::test]
    async fn surfaces_http_errors_with_body() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::NOT_FOUND, "model 'nope' not found") }),
        );
        let host = spawn(app).await;
        let client = OllamaClient::new(host, "nope", None).expect("Failed to build client");

        let err = client.generate("hi").await.unwrap_err();

        match err {
            GenerationError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "model 'nope' not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn rejects_an_empty_message() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                Json(serde_json::json!({
                    "message": {"role": "assistant", "content": "   "},
                    "done": true
                }))
            }),
        );
        let host = spawn(app).await;
        let client = OllamaClient::new(host, "llama3.2", None).expect("Failed to build client");

        assert!(matches!(
            client.generate("hi").await,
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn counts_a_failed_connection_as_a_batch_failure() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write(&dir.path().join("tone--formal.md"), "# Formal");
        // Nothing listens on port 9 locally.
        let client = OllamaClient::new("127.0.0.1:9", "llama3.2", Some(Duration::from_secs(2)))
            .expect("Failed to build client");

        let documents = rewrite::discover(dir.path()).expect("Discover failed");
        let report = rewrite::run_batch(&documents, &client, &no_delay(), |_| {}).await;

        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].detail.starts_with("HTTP request failed"));
        assert_eq!(
            fs::read_to_string(dir.path().join("tone--formal.md")).expect("Read failed"),
            "# Formal"
        );
    }
}
