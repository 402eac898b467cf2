//! End-to-end pipeline behavior: refinement outcomes and stage tagging.

mod common;

use std::sync::Arc;

use figgen::{ArtifactStore, MemStore, Provider, Stage, Verdict};

use common::{orchestrator, request, ScriptedProvider};

#[tokio::test]
async fn test_accepts_on_second_round() {
    let provider = Arc::new(ScriptedProvider::accepting_on(2));
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        3,
    );

    let result = orch.run(&request()).await.unwrap();

    assert_eq!(result.rounds, 2);
    assert_eq!(result.iterations.len(), 2);
    assert_eq!(result.iterations[0].round, 1);
    assert_eq!(result.iterations[0].verdict, Verdict::Revise);
    assert_eq!(
        result.iterations[0].revised_description.as_deref(),
        Some("revision 1")
    );
    assert_eq!(result.iterations[1].round, 2);
    assert_eq!(result.iterations[1].verdict, Verdict::Accept);

    // The accepted render used the critic's rewrite
    assert_eq!(result.description, "revision 1");
    assert!(result.artifact_key.ends_with("round_2.png"));
}

#[tokio::test]
async fn test_exhausted_budget_returns_last_artifact() {
    let provider = Arc::new(ScriptedProvider::always_revising());
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        3,
    );

    let result = orch.run(&request()).await.unwrap();

    // Exhaustion is a success: exactly max_rounds cycles ran, and the
    // final render is handed back even though the critic never accepted.
    assert_eq!(result.rounds, 3);
    assert_eq!(result.iterations.len(), 3);
    assert!(result
        .iterations
        .iter()
        .all(|it| it.verdict == Verdict::Revise));
    assert!(result.artifact_key.ends_with("round_3.png"));
    assert_eq!(provider.render_calls(), 3);
    assert_eq!(provider.critique_calls(), 3);
}

#[tokio::test]
async fn test_request_overrides_round_budget() {
    let provider = Arc::new(ScriptedProvider::always_revising());
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        5,
    );

    let mut req = request();
    req.max_rounds = Some(1);
    let result = orch.run(&req).await.unwrap();

    assert_eq!(result.rounds, 1);
    assert_eq!(result.iterations.len(), 1);
    assert!(result.artifact_key.ends_with("round_1.png"));
}

#[tokio::test]
async fn test_every_round_artifact_is_stored() {
    let provider = Arc::new(ScriptedProvider::always_revising());
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        2,
    );

    let result = orch.run(&request()).await.unwrap();

    // Both intermediate and final renders land in the store
    let run_prefix = result.artifact_key.split('/').next().unwrap().to_string();
    for round in 1..=2u32 {
        let key = format!("{run_prefix}/round_{round}.png");
        let bytes = store.get(&key).await.unwrap();
        assert!(bytes.is_some(), "missing artifact for round {round}");
    }
    let final_bytes = store.get(&result.artifact_key).await.unwrap().unwrap();
    assert_eq!(final_bytes, b"png:render-2");
}

#[tokio::test]
async fn test_render_failure_is_tagged_rendering() {
    let provider = Arc::new(ScriptedProvider::failing_render_on(1));
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        3,
    );

    let err = orch.run(&request()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Rendering);
    assert!(err.to_string().starts_with("rendering stage failed"));
    assert_eq!(provider.critique_calls(), 0);
}

#[tokio::test]
async fn test_mid_loop_render_failure_discards_history() {
    let provider = Arc::new(ScriptedProvider::revising_until_render_fails_on(2));
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        3,
    );

    let err = orch.run(&request()).await.unwrap_err();

    // Round one completed before the failure, but the run as a whole fails
    assert_eq!(err.stage, Stage::Rendering);
    assert_eq!(provider.critique_calls(), 1);
}

#[tokio::test]
async fn test_style_failure_is_tagged_planning() {
    let provider = Arc::new(ScriptedProvider::failing_style());
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        3,
    );

    let err = orch.run(&request()).await.unwrap_err();

    assert_eq!(err.stage, Stage::Planning);
    assert_eq!(provider.render_calls(), 0);
}

#[tokio::test]
async fn test_invalid_request_is_tagged_validation() {
    let provider = Arc::new(ScriptedProvider::accepting());
    let store = Arc::new(MemStore::new());
    let orch = orchestrator(
        Arc::clone(&provider) as Arc<dyn Provider>,
        Arc::clone(&store) as Arc<dyn ArtifactStore>,
        3,
    );

    let mut req = request();
    req.source_text = "   ".to_string();
    let err = orch.run(&req).await.unwrap_err();

    assert_eq!(err.stage, Stage::Validation);
    assert_eq!(provider.render_calls(), 0);
}
