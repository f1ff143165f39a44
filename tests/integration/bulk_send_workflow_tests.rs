/*!
 * Integration tests for the login, contact upload and send workflow
 */

use anyhow::Result;
use std::sync::Arc;
use tokio_test;

use wabulk::app_controller::Controller;
use wabulk::errors::SendError;
use wabulk::markup::{load_message, RichTextNode};
use wabulk::providers::mock::ScriptedBackend;
use wabulk::providers::SendReport;
use wabulk::session::StatusResponse;
use crate::common;

const MESSAGE_HTML: &str = "<p>Hi <strong>there</strong>,</p><p><br></p><p>Our <em>spring</em> sale is on. <s>20%</s> 30% off!</p>";

/// Authenticated controller over a backend that imports `sample_contacts`
async fn connected_controller(dir: &std::path::Path) -> Result<(Controller<ScriptedBackend>, Arc<ScriptedBackend>)> {
    let backend = Arc::new(
        ScriptedBackend::from_statuses([StatusResponse::with_qr(common::QR_DATA_URL), StatusResponse::Authenticated])
            .with_contacts(common::sample_contacts()),
    );
    let controller = Controller::new(common::test_config(dir), Arc::clone(&backend), "user_1");
    controller.authenticate().await?;
    Ok((controller, backend))
}

#[tokio::test(start_paused = true)]
async fn test_bulkSend_fullWorkflow_shouldSendTranslatedMessage() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let contacts_path = common::create_test_contacts(temp_dir.path(), "contacts.csv")?;
    let message_path = common::create_test_file(temp_dir.path(), "message.html", MESSAGE_HTML)?;

    let (controller, backend) = connected_controller(temp_dir.path()).await?;

    let contacts = controller.upload_contacts(&contacts_path).await?;
    assert_eq!(contacts, common::sample_contacts());

    let report = controller.send(contacts, &load_message(&message_path)?).await?;
    assert_eq!(report, SendReport { count: 3 });

    let sent = backend.sent_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].contacts, common::sample_contacts());
    assert_eq!(sent[0].message, "Hi *there*,\n\nOur _spring_ sale is on. ~20%~ 30% off!");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_bulkSend_noContacts_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (controller, backend) = connected_controller(temp_dir.path()).await?;

    let result = controller.send(Vec::new(), &RichTextNode::wrap_text("p", "hello")).await;

    assert!(matches!(result, Err(SendError::NoContacts)));
    assert!(backend.sent_requests().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_bulkSend_blankMessage_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (controller, backend) = connected_controller(temp_dir.path()).await?;

    let blank = RichTextNode::element(
        "body",
        vec![
            RichTextNode::wrap_text("p", "   "),
            RichTextNode::element("p", vec![RichTextNode::line_break()]),
        ],
    );
    let result = controller.send(common::sample_contacts(), &blank).await;

    assert!(matches!(result, Err(SendError::EmptyMessage)));
    assert!(backend.sent_requests().is_empty());
    Ok(())
}

#[test]
fn test_bulkSend_beforeAuthentication_shouldBeRejected() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let backend = Arc::new(ScriptedBackend::default().with_contacts(common::sample_contacts()));
    let controller = Controller::new(common::test_config(temp_dir.path()), Arc::clone(&backend), "user_1");

    let result = tokio_test::block_on(controller.send(common::sample_contacts(), &RichTextNode::text("hi")));

    assert!(matches!(result, Err(SendError::NotAuthenticated(ref identity)) if identity == "user_1"));
    assert!(backend.sent_requests().is_empty());
    Ok(())
}

#[test]
fn test_uploadContacts_beforeAuthentication_shouldBeRejected() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let contacts_path = common::create_test_contacts(temp_dir.path(), "contacts.csv")?;
    let controller = Controller::new(
        common::test_config(temp_dir.path()),
        Arc::new(ScriptedBackend::default()),
        "user_1",
    );

    let result = tokio_test::block_on(controller.upload_contacts(&contacts_path));

    let error = result.unwrap_err();
    assert!(error.to_string().contains("not authenticated"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_uploadContacts_missingFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (controller, _backend) = connected_controller(temp_dir.path()).await?;

    let result = controller.upload_contacts(&temp_dir.path().join("missing.csv")).await;

    assert!(format!("{:#}", result.unwrap_err()).contains("missing.csv"));
    Ok(())
}
