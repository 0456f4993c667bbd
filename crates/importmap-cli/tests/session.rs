//! End-to-end runs of an import session over files on disk.

use std::fs;
use std::path::PathBuf;

use importmap_cli::config::Config;
use importmap_cli::session::ImportSession;
use importmap_map::{SuggestionProvider, SuggestionProviderError};
use importmap_model::{MatchCandidate, RequestType, SuggestionRequest, SuggestionResponse};
use tempfile::TempDir;

const PEOPLE: &str = "\
Email,Surname,First Name,Ref,Division,Job Title,Manager
ann@example.com,Smith,Ann,R1,Sales,Engineer,Bob
tim-at-example,Jones,Tim,R2,Ops,\"Lead, Ops\",Ann
";

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn local_session() -> ImportSession {
    ImportSession::new(&Config::default()).unwrap()
}

/// Answers messages only; upload requests get an empty reply.
struct MessageProvider {
    reply: Vec<MatchCandidate>,
}

impl SuggestionProvider for MessageProvider {
    fn fetch(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, SuggestionProviderError> {
        if request.request_type != RequestType::Message {
            return Ok(SuggestionResponse::default());
        }
        Ok(SuggestionResponse {
            content: format!("You said: {}", request.message.clone().unwrap_or_default()),
            mapping_suggestion: None,
            mapping_suggestions: Some(self.reply.clone()),
        })
    }
}

/// Fails every request with a gateway error.
struct UnavailableProvider;

impl SuggestionProvider for UnavailableProvider {
    fn fetch(&self, _request: &SuggestionRequest) -> Result<SuggestionResponse, SuggestionProviderError> {
        Err(SuggestionProviderError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        })
    }
}

#[test]
fn load_validate_fix_export() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "people.csv", PEOPLE);
    let mut session = local_session();

    let upload = session.load_file(&path).unwrap();
    assert_eq!(upload.rows, 2);
    assert!(upload.provider_error.is_none());
    assert_eq!(upload.outcome.applied.len(), 6);
    assert!(!session.state().is_complete());

    session.accept("Forename(s)").unwrap();
    assert!(session.state().is_complete());

    let report = session.validate().unwrap();
    let issue = report.issue("Email").unwrap();
    assert_eq!(issue.sample_rows(), vec![3]);

    let correction = session.fix(3, "email", "tim@example.com").unwrap();
    assert!(correction.passes);
    assert_eq!(
        correction.message(),
        "Fixed: Updated Email in row 3 from \"tim-at-example\" to \"tim@example.com\""
    );
    assert!(session.report().unwrap().is_clean());

    let output = session.export().unwrap();
    insta::assert_snapshot!(output.trim_end(), @r#"
    Reference,Org Unit,Forename(s),Surname,Email,Job Title,Manager Name
    R1,Sales,Ann,Smith,ann@example.com,Engineer,Bob
    R2,Ops,Tim,Jones,tim@example.com,"Lead, Ops",Ann
    "#);
    assert_eq!(session.export_file_name(), "people-mapped.csv");
}

#[test]
fn export_is_blocked_until_every_caption_is_confirmed() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "people.csv", PEOPLE);
    let mut session = local_session();
    session.load_file(&path).unwrap();

    let err = session.export().unwrap_err();
    let blocked = err.blocked().copied().unwrap();
    assert_eq!((blocked.confirmed, blocked.total), (6, 7));
    assert!(session.validate().is_err());
}

#[test]
fn caption_edits_shape_matching() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "staff.tsv", "Ref\tMail\nR1\tann@example.com\n");
    let mut config = Config::default();
    config.import.delimiter = importmap_model::Delimiter::Tab;
    config.captions.slots = vec!["Reference".to_string(), "Email".to_string()];
    let mut session = ImportSession::new(&config).unwrap();

    session.state_mut().add_slot("Phone").unwrap();
    session.state_mut().remove_slot("Phone").unwrap();
    session.load_file(&path).unwrap();
    session.accept_all();

    assert!(session.state().is_complete());
    assert_eq!(session.export().unwrap(), "Reference\tEmail\nR1\tann@example.com\n");
    assert_eq!(session.export_file_name(), "staff-mapped.tsv");
}

#[test]
fn message_reply_is_applied_as_confirmation() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "people.csv", PEOPLE);
    let provider = MessageProvider {
        reply: vec![
            MatchCandidate::new("First Name", "forename(s)", 0.9),
            MatchCandidate::new("Nickname", "Surname", 0.9),
        ],
    };
    let mut session = local_session().with_provider(Some(Box::new(provider)));
    session.load_file(&path).unwrap();

    let reply = session.send_message("First Name is the forename").unwrap();
    assert_eq!(reply.content, "You said: First Name is the forename");
    assert!(reply.provider_error.is_none());
    assert_eq!(
        reply.applied,
        vec![MatchCandidate::new("First Name", "Forename(s)", 0.9)]
    );

    let forename = session.state().slot("Forename(s)").unwrap();
    assert!(forename.confirmed);
    assert_eq!(forename.confidence, Some(0.9));
    assert!(session.state().is_complete());
}

#[test]
fn message_without_provider_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "people.csv", PEOPLE);
    let mut session = local_session();
    session.load_file(&path).unwrap();
    assert!(session.send_message("hello").is_err());
}

#[test]
fn unsupported_file_is_rejected_without_touching_state() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "people.xlsx", PEOPLE);
    let mut session = local_session();
    let before = session.state().clone();
    assert!(session.load_file(&path).is_err());
    assert_eq!(session.state(), &before);
    assert!(session.table().is_none());
}

#[test]
fn failed_message_keeps_the_session_going() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "people.csv", PEOPLE);
    let mut session = local_session().with_provider(Some(Box::new(UnavailableProvider)));

    let upload = session.load_file(&path).unwrap();
    assert!(matches!(
        upload.provider_error,
        Some(SuggestionProviderError::Status { status: 502, .. })
    ));
    session.confirm("First Name", "Forename(s)").unwrap();
    let before = session.state().clone();

    let reply = session.send_message("map the first name column").unwrap();
    assert!(reply.applied.is_empty() && reply.rejected.is_empty());
    assert_eq!(reply.content, "The suggestion service reported an error.");
    assert!(matches!(
        reply.provider_error,
        Some(SuggestionProviderError::Status { status: 502, .. })
    ));
    assert_eq!(session.state(), &before);

    let output = session.export().unwrap();
    assert!(output.starts_with("Reference,Org Unit,Forename(s),Surname,Email,Job Title,Manager Name\n"));
}
