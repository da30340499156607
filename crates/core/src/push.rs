use crate::domain::{Lead, PushFailure, PushReport};
use crate::ports::ContactCreator;
use crate::utils::split_name;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Maps a lead onto the CRM contact properties it is created with.
/// Missing values are sent as empty strings.
pub fn lead_properties(lead: &Lead) -> BTreeMap<String, String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let (firstname, lastname) = lead
        .name
        .as_deref()
        .map(split_name)
        .unwrap_or_default();
    let profile_link = text(&lead.profile_link);

    [
        ("post_id", text(&lead.post_id)),
        ("reaction_type", text(&lead.reaction_type)),
        ("platform", text(&lead.platform)),
        ("company_id", text(&lead.company_id)),
        ("post_name", text(&lead.post_name)),
        ("firstname", firstname),
        ("lastname", lastname),
        ("jobtitle", text(&lead.occupation)),
        (
            "linkedin_profile_url_organic_social_pipeline",
            profile_link.clone(),
        ),
        ("hs_linkedin_url", profile_link.clone()),
        ("pb_linkedin_profile_url", profile_link),
        ("phantombuster_source_user_id", text(&lead.source_user_id)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Creates every lead in the CRM, one call per lead.
///
/// Each outcome is logged and recorded; a failed create never stops the
/// remaining leads from being attempted.
pub fn push_leads<C>(creator: &C, leads: &[Lead]) -> PushReport
where
    C: ContactCreator + ?Sized,
{
    let mut report = PushReport::default();
    if leads.is_empty() {
        info!("No new leads pushed");
        return report;
    }

    for lead in leads {
        let label = lead.label().to_string();
        match creator.create_contact(&lead_properties(lead)) {
            Ok(()) => {
                info!(lead = %label, "Successfully pushed lead");
                report.pushed.push(label);
            }
            Err(e) => {
                warn!(lead = %label, error = %e, "Failed to push lead");
                report.failed.push(PushFailure {
                    lead: label,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        pushed = report.pushed.len(),
        failed = report.failed.len(),
        "push finished"
    );
    report
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{Result, SyncError};
    use std::cell::RefCell;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Collects the level and message of every event emitted while installed.
    #[derive(Clone, Default)]
    struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

    impl CapturedEvents {
        fn count(&self, level: Level, message: &str) -> usize {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, m)| *l == level && m == message)
                .count()
        }
    }

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CapturedEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), visitor.0));
        }
    }

    /// Accepts or rejects creates by LinkedIn URL and keeps every payload it saw.
    pub(crate) struct RecordingCreator {
        pub(crate) rejected: Vec<String>,
        pub(crate) seen: RefCell<Vec<BTreeMap<String, String>>>,
    }

    impl RecordingCreator {
        pub(crate) fn rejecting(urls: &[&str]) -> Self {
            Self {
                rejected: urls.iter().map(|u| u.to_string()).collect(),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ContactCreator for RecordingCreator {
        fn create_contact(&self, properties: &BTreeMap<String, String>) -> Result<()> {
            self.seen.borrow_mut().push(properties.clone());
            if self.rejected.contains(&properties["hs_linkedin_url"]) {
                return Err(SyncError::Http {
                    status: 400,
                    body: "Property values were not valid".to_string(),
                });
            }
            Ok(())
        }
    }

    fn lead(name: &str, url: &str) -> Lead {
        Lead {
            name: Some(name.to_string()),
            profile_link: Some(url.to_string()),
            ..Lead::default()
        }
    }

    #[test]
    fn test_two_failures_one_success() {
        let creator = RecordingCreator::rejecting(&["https://in/a", "https://in/c"]);
        let leads = vec![
            lead("Ada Lovelace", "https://in/a"),
            lead("Grace Hopper", "https://in/b"),
            lead("Alan Turing", "https://in/c"),
        ];

        let report = push_leads(&creator, &leads);

        assert_eq!(report.pushed, vec!["Grace Hopper".to_string()]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].lead, "Ada Lovelace");
        assert_eq!(report.failed[1].lead, "Alan Turing");
        assert_eq!(creator.seen.borrow().len(), 3);
    }

    #[test]
    fn test_push_logs_each_outcome() {
        let creator = RecordingCreator::rejecting(&["https://in/a", "https://in/c"]);
        let leads = vec![
            lead("Ada Lovelace", "https://in/a"),
            lead("Grace Hopper", "https://in/b"),
            lead("Alan Turing", "https://in/c"),
        ];
        let events = CapturedEvents::default();
        let subscriber = tracing_subscriber::registry().with(events.clone());

        tracing::subscriber::with_default(subscriber, || push_leads(&creator, &leads));

        assert_eq!(events.count(Level::WARN, "Failed to push lead"), 2);
        assert_eq!(events.count(Level::INFO, "Successfully pushed lead"), 1);
    }

    #[test]
    fn test_empty_push_logs_nothing_pushed() {
        let creator = RecordingCreator::rejecting(&[]);
        let events = CapturedEvents::default();
        let subscriber = tracing_subscriber::registry().with(events.clone());

        tracing::subscriber::with_default(subscriber, || push_leads(&creator, &[]));

        assert_eq!(events.count(Level::INFO, "No new leads pushed"), 1);
    }

    #[test]
    fn test_empty_push_makes_no_calls() {
        let creator = RecordingCreator::rejecting(&[]);
        let report = push_leads(&creator, &[]);
        assert_eq!(report.attempted(), 0);
        assert!(creator.seen.borrow().is_empty());
    }

    #[test]
    fn test_lead_properties_mapping() {
        let lead = Lead {
            source_user_id: Some("987".to_string()),
            name: Some("Ada King Lovelace".to_string()),
            occupation: Some("Analyst".to_string()),
            profile_link: Some("https://in/ada".to_string()),
            company_id: Some("acme".to_string()),
            post_id: Some("P1".to_string()),
            post_name: Some("Launch".to_string()),
            reaction_type: Some("LIKE".to_string()),
            platform: Some("LinkedIn".to_string()),
        };

        let props = lead_properties(&lead);

        assert_eq!(props["firstname"], "Ada");
        assert_eq!(props["lastname"], "King Lovelace");
        assert_eq!(props["jobtitle"], "Analyst");
        assert_eq!(props["hs_linkedin_url"], "https://in/ada");
        assert_eq!(props["pb_linkedin_profile_url"], "https://in/ada");
        assert_eq!(props["linkedin_profile_url_organic_social_pipeline"], "https://in/ada");
        assert_eq!(props["phantombuster_source_user_id"], "987");
        assert_eq!(props["company_id"], "acme");
        assert_eq!(props["post_name"], "Launch");
        assert_eq!(props.len(), 12);
    }

    #[test]
    fn test_lead_properties_missing_values_are_empty() {
        let props = lead_properties(&Lead::default());
        assert_eq!(props["firstname"], "");
        assert_eq!(props["lastname"], "");
        assert_eq!(props["post_id"], "");
        assert_eq!(props.len(), 12);
    }
}
