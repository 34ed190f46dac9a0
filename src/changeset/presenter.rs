//! Rendering a change set as an operator-readable table.
//!
//! The output is a header line identifying the stack and change set,
//! followed by one table row per planned resource change, in the order the
//! service intends to apply them.

use std::fmt::Write;
use tabled::settings::peaker::Priority;
use tabled::settings::Width;
use tabled::{Table, Tabled};

use crate::cloudformation::ChangeSetDescription;

/// Presentation options.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentOptions {
    /// Maximum table width in columns. Content wider than this wraps; rows
    /// are never dropped.
    pub table_width: Option<usize>,
}

/// Table row for a single resource change.
#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "ResourceType")]
    resource_type: String,
    #[tabled(rename = "LogicalResourceID")]
    logical_resource_id: String,
}

/// Renders a change set description as text.
#[must_use]
pub fn render_change_set(description: &ChangeSetDescription, options: &PresentOptions) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "StackName: {}, ChangeSetName: {}",
        description.stack_name, description.change_set_name
    );

    let rows: Vec<ChangeRow> = description
        .changes
        .iter()
        .map(|change| ChangeRow {
            action: change.action.clone(),
            resource_type: change.resource_type.clone(),
            logical_resource_id: change.logical_resource_id.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    if let Some(width) = options.table_width {
        // Shrink the widest column first so narrow cells keep their text.
        table.with(Width::wrap(width).priority(Priority::max(false)));
    }

    output.push_str(&table.to_string());
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudformation::{ChangeSetStatus, ExecutionStatus, ResourceChange};

    fn description(changes: Vec<ResourceChange>) -> ChangeSetDescription {
        ChangeSetDescription {
            stack_name: String::from("my-service-dev"),
            change_set_name: String::from("add-lambda"),
            status: ChangeSetStatus::CreateComplete,
            execution_status: ExecutionStatus::Available,
            status_reason: None,
            changes,
        }
    }

    fn change(action: &str, resource_type: &str, logical_id: &str) -> ResourceChange {
        ResourceChange {
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            logical_resource_id: logical_id.to_string(),
        }
    }

    #[test]
    fn test_header_line_identifies_stack_and_change_set() {
        let output = render_change_set(&description(Vec::new()), &PresentOptions::default());
        assert!(output.starts_with("StackName: my-service-dev, ChangeSetName: add-lambda"));
    }

    #[test]
    fn test_single_change_renders_header_and_row() {
        let desc = description(vec![change("Add", "AWS::Lambda::Function", "HelloFunc")]);
        let output = render_change_set(&desc, &PresentOptions::default());

        assert!(output.contains("Action"));
        assert!(output.contains("ResourceType"));
        assert!(output.contains("LogicalResourceID"));
        assert!(output.contains("Add"));
        assert!(output.contains("AWS::Lambda::Function"));
        assert!(output.contains("HelloFunc"));
    }

    #[test]
    fn test_row_order_matches_descriptor_order() {
        let desc = description(vec![
            change("Add", "AWS::S3::Bucket", "FirstBucket"),
            change("Modify", "AWS::Lambda::Function", "SecondFunc"),
            change("Remove", "AWS::SQS::Queue", "ThirdQueue"),
        ]);
        let output = render_change_set(&desc, &PresentOptions::default());

        let first = output.find("FirstBucket").expect("first row missing");
        let second = output.find("SecondFunc").expect("second row missing");
        let third = output.find("ThirdQueue").expect("third row missing");
        assert!(first < second && second < third);

        // Header row precedes all data rows.
        let header = output.find("LogicalResourceID").expect("header missing");
        assert!(header < first);
    }

    #[test]
    fn test_width_constraint_wraps_without_dropping_rows() {
        let desc = description(vec![
            change("Add", "AWS::Lambda::Function", "AVeryLongLogicalResourceIdentifier"),
            change("Remove", "AWS::DynamoDB::Table", "AnotherVeryLongIdentifier"),
        ]);
        let narrow = render_change_set(&desc, &PresentOptions { table_width: Some(40) });

        for line in narrow.lines().skip(1) {
            assert!(line.chars().count() <= 40, "line too wide: {line}");
        }
        // Wrapping must not empty out the narrow columns.
        assert!(narrow.contains("Action"));
        assert!(narrow.contains("Add"));
        assert!(narrow.contains("Remove"));
    }
}
