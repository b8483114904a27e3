// tests/error_handling_tests.rs
mod common;

use anyhow::anyhow;
use common::*;
use serial_test::serial;
use storefront_flow::{ContextData, FlowError, Pipeline, PipelineControl};

#[tokio::test]
#[serial]
async fn test_pipeline_run_catches_handler_missing() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("missing", false, None)]);
  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  match result.unwrap_err() {
    TestError::Flow(s) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
    }
    other => panic!("Expected TestError::Flow(HandlerMissing), got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_flow_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new(&[("task", false, None)]);
  pipeline.on_root("task", |ctx: ContextData<TestContext>| async move {
    ctx.write().counter = 1;
    Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().counter, 1);

  let mut failing = Pipeline::<TestContext, FlowError>::new(&[("fail_task", false, None)]);
  failing.on_root("fail_task", |_ctx| async move {
    Err::<PipelineControl, _>(FlowError::Internal("Intentional failure".to_string()))
  });
  match failing.run(ContextData::new(TestContext::default())).await {
    Err(FlowError::Internal(s)) => assert_eq!(s, "Intentional failure"),
    other => panic!("Expected FlowError::Internal, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_anyhow_handler_errors_convert_into_flow_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new(&[("task", false, None)]);
  pipeline.on_root("task", |_ctx| async move {
    Err::<PipelineControl, anyhow::Error>(anyhow!("downstream said no"))
  });

  match pipeline.run(ContextData::new(TestContext::default())).await {
    Err(FlowError::Handler { source }) => assert_eq!(source.to_string(), "downstream said no"),
    other => panic!("Expected FlowError::Handler, got {:?}", other),
  }
}

#[test]
fn test_anyhow_wrapping_flow_error_is_unwrapped() {
  let wrapped = anyhow::Error::new(FlowError::Internal("inner".to_string()));
  match FlowError::from(wrapped) {
    FlowError::Internal(s) => assert_eq!(s, "inner"),
    other => panic!("Expected the inner FlowError back, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_optional_step_swallows_errors_but_required_does_not() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("opt", true, None), ("req", false, None)]);
  pipeline.on_root("opt", create_failing_handler("opt", "soft"));
  pipeline.on_root("req", create_failing_handler("req", "hard"));

  let ctx = ContextData::new(TestContext::default());
  let err = pipeline.run(ctx.clone()).await.unwrap_err();
  assert_eq!(err, TestError::Handler("hard".to_string()));
  assert_eq!(ctx.read().steps_executed, vec!["opt", "req"]);
}
