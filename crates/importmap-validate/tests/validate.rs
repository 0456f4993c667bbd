//! Validation and correction over parsed files.

use importmap_ingest::{analyze_table, parse};
use importmap_model::{CaptionSlot, DateFormat, Delimiter, ImportColumn, ImportTable};
use importmap_validate::{CorrectionError, apply_correction, validate};

fn load(text: &str) -> (ImportTable, Vec<ImportColumn>) {
    let table = ImportTable::new(parse(text, Delimiter::Comma).unwrap(), true);
    let columns = analyze_table(&table);
    (table, columns)
}

fn confirmed(pairs: &[(&str, &str)]) -> Vec<CaptionSlot> {
    pairs
        .iter()
        .enumerate()
        .map(|(order, (caption, column))| {
            let mut slot = CaptionSlot::new(*caption, order);
            slot.column = Some((*column).to_string());
            slot.confirmed = true;
            slot
        })
        .collect()
}

#[test]
fn loose_email_check_flags_only_the_second_row() {
    let (table, columns) = load("Email\nabc@x\nnot-an-email\n");
    let slots = confirmed(&[("Email", "Email")]);
    let report = validate(&slots, &table, &columns, DateFormat::default()).unwrap();

    assert_eq!(report.issues.len(), 1);
    let issue = &report.issues[0];
    assert_eq!(issue.rule, "Invalid email");
    assert_eq!(issue.count, 1);
    assert_eq!(issue.sample_rows(), vec![3]);
    assert_eq!(issue.samples[0].value, "not-an-email");
    assert_eq!(report.summary(), "1 issue found");
}

#[test]
fn start_date_follows_configured_format() {
    let text = "Joined,Ref\n2024-01-31,R1\n31/01/2024,\n,R3\n";
    let (table, columns) = load(text);
    let slots = confirmed(&[("Start Date", "Joined"), ("Reference", "Ref")]);

    let dmy = validate(&slots, &table, &columns, DateFormat::DayMonthYear).unwrap();
    let issue = dmy.issue("start date").unwrap();
    assert_eq!(issue.rule, "Expected date format DD/MM/YYYY");
    assert_eq!(issue.sample_rows(), vec![2]);
    assert!(dmy.issue("Reference").is_none());

    let iso = validate(&slots, &table, &columns, DateFormat::YearMonthDay).unwrap();
    assert_eq!(iso.issue("Start Date").unwrap().sample_rows(), vec![3]);
}

#[test]
fn samples_are_capped_at_five() {
    let mut text = String::from("Phone\n");
    for n in 0..8 {
        text.push_str(&format!("12{n}\n"));
    }
    let (table, columns) = load(&text);
    let slots = confirmed(&[("Phone", "Phone")]);
    let report = validate(&slots, &table, &columns, DateFormat::default()).unwrap();
    let issue = report.issue("Phone").unwrap();
    assert_eq!(issue.count, 8);
    assert_eq!(issue.sample_rows(), vec![2, 3, 4, 5, 6]);
    assert_eq!(report.bad_values(), 8);
}

#[test]
fn passing_correction_removes_its_sample() {
    let (mut table, columns) = load("Email,Name\nbad one,Ann\nworse,Bob\nok@x.io,Cy\n");
    let slots = confirmed(&[("Email", "Email"), ("Full Name", "Name")]);
    let mut report = validate(&slots, &table, &columns, DateFormat::default()).unwrap();
    assert_eq!(report.issue("Email").unwrap().count, 2);

    let fix = apply_correction(&mut table, &slots, &columns, "email", 2, " ann@x.io ", &mut report)
        .unwrap();
    assert!(fix.passes);
    assert_eq!(fix.message(), "Fixed: Updated Email in row 2 from \"bad one\" to \"ann@x.io\"");
    assert_eq!(table.cell(0, 0), Some("ann@x.io"));

    let issue = report.issue("Email").unwrap();
    assert_eq!(issue.count, 1);
    assert_eq!(issue.sample_rows(), vec![3]);

    let fix = apply_correction(&mut table, &slots, &columns, "Email", 3, "still bad", &mut report)
        .unwrap();
    assert!(!fix.passes);
    assert_eq!(report.issue("Email").unwrap().samples[0].value, "still bad");

    apply_correction(&mut table, &slots, &columns, "Email", 3, "bob@x.io", &mut report).unwrap();
    assert!(report.is_clean());
}

#[test]
fn failing_correction_of_a_good_cell_adds_an_issue() {
    let (mut table, columns) = load("Email\na@x.io\nb@x.io\n");
    let slots = confirmed(&[("Email", "Email")]);
    let mut report = validate(&slots, &table, &columns, DateFormat::default()).unwrap();
    assert!(report.is_clean());

    apply_correction(&mut table, &slots, &columns, "Email", 3, "nope", &mut report).unwrap();
    let issue = report.issue("Email").unwrap();
    assert_eq!(issue.count, 1);
    assert_eq!(issue.sample_rows(), vec![3]);
}

#[test]
fn correction_rejects_unknown_targets() {
    let (mut table, columns) = load("Email\na@x.io\n");
    let mut slots = confirmed(&[("Email", "Email")]);
    slots.push(CaptionSlot::new("Phone", 1));
    let mut report = validate(&confirmed(&[("Email", "Email")]), &table, &columns, DateFormat::default())
        .unwrap();

    let err = apply_correction(&mut table, &slots, &columns, "Email", 1, "x", &mut report).unwrap_err();
    assert_eq!(err, CorrectionError::RowOutOfRange { row: 1, first: 2, last: 2 });
    assert!(matches!(
        apply_correction(&mut table, &slots, &columns, "Phone", 2, "x", &mut report),
        Err(CorrectionError::Unassigned { .. })
    ));
    assert!(matches!(
        apply_correction(&mut table, &slots, &columns, "Salary", 2, "x", &mut report),
        Err(CorrectionError::CaptionNotFound { .. })
    ));
}
