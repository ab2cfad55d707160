//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire a `StoreContext` against fixture backends and an in-memory
//!   saved-query database.
//! - Print a few projections so core wiring can be checked without a UI.
//! - Optionally start file logging: `contentdesk_cli [absolute-log-dir]`.

use contentdesk_core::backend::{
    JobsBackend, RuleSimulatorBackend, TableFieldsBackend, TemplatesBackend,
};
use contentdesk_core::db::open_db_in_memory;
use contentdesk_core::model::job::{Job, JobFilter, JobStatus};
use contentdesk_core::model::rule::{SimulationRequest, SimulationResult};
use contentdesk_core::model::saved_query::QuerySpec;
use contentdesk_core::model::table_field::TableField;
use contentdesk_core::model::template::{Template, TemplateId};
use contentdesk_core::{
    init_logging, BackendError, BackendResult, Backends, ContextConfig, Page, RecordingNotifier,
    SqliteSavedQueryRepository, StoreContext,
};
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::error::Error;
use std::rc::Rc;

struct FixtureBackend {
    templates: Vec<Template>,
}

impl JobsBackend for FixtureBackend {
    fn list_jobs(&self, filter: JobFilter) -> LocalBoxFuture<'_, BackendResult<Page<Job>>> {
        let jobs = vec![
            Job::new("reindex", JobStatus::Running),
            Job::new("export", JobStatus::Succeeded),
        ];
        let items: Vec<Job> = jobs
            .into_iter()
            .filter(|job| filter.status.map_or(true, |status| job.status == status))
            .collect();
        future::ready(Ok(Page::complete(items))).boxed_local()
    }
}

impl TemplatesBackend for FixtureBackend {
    fn list_templates(&self) -> LocalBoxFuture<'_, BackendResult<Page<Template>>> {
        future::ready(Ok(Page::complete(self.templates.clone()))).boxed_local()
    }

    fn get_template(&self, id: TemplateId) -> LocalBoxFuture<'_, BackendResult<Template>> {
        let found = self
            .templates
            .iter()
            .find(|template| template.id == id)
            .cloned()
            .ok_or_else(|| BackendError::not_found(format!("template {id}")));
        future::ready(found).boxed_local()
    }
}

impl RuleSimulatorBackend for FixtureBackend {
    fn simulate(
        &self,
        request: SimulationRequest,
    ) -> LocalBoxFuture<'_, BackendResult<SimulationResult>> {
        let matched = request.input.contains_key("status");
        future::ready(Ok(SimulationResult {
            matched,
            actions: if matched {
                vec!["notify_owner".to_string()]
            } else {
                Vec::new()
            },
            trace: vec![format!("evaluated `{}`", request.rule)],
        }))
        .boxed_local()
    }
}

impl TableFieldsBackend for FixtureBackend {
    fn list_fields(&self, _entity: String) -> LocalBoxFuture<'_, BackendResult<Vec<TableField>>> {
        future::ready(Ok(vec![
            TableField::new("title", "Title", 0),
            TableField::new("updated_at", "Updated", 1),
        ]))
        .boxed_local()
    }

    fn save_fields(
        &self,
        _entity: String,
        fields: Vec<TableField>,
    ) -> LocalBoxFuture<'_, BackendResult<Vec<TableField>>> {
        future::ready(Ok(fields)).boxed_local()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = ContextConfig::default();
    if let Some(log_dir) = std::env::args().nth(1) {
        init_logging(&config.log_level, &log_dir)?;
    }

    let fixture = Rc::new(FixtureBackend {
        templates: vec![Template::new("welcome", "Hello {{ name }}!")],
    });
    let saved_queries = Rc::new(SqliteSavedQueryRepository::new(open_db_in_memory()?));
    let notifier = Rc::new(RecordingNotifier::new());

    let context = StoreContext::new(
        Backends {
            jobs: fixture.clone(),
            templates: fixture.clone(),
            rule_simulator: fixture.clone(),
            table_fields: fixture,
            saved_queries,
        },
        notifier.clone(),
        config,
    )?;

    futures::executor::block_on(async {
        context.jobs().load(false).await?;
        context.templates().load(false).await?;
        context.table_fields().load("articles", false).await?;
        context
            .saved_queries()
            .save("  running   jobs ", QuerySpec::default())
            .await?;
        Ok::<(), Box<dyn Error>>(())
    })?;

    println!("contentdesk_core version={}", contentdesk_core::core_version());
    println!("jobs active={}", context.jobs().active_count().get());
    println!("template placeholders={:?}", {
        let templates = context.templates();
        if let Some(first) = templates.items().get().first() {
            templates.select(first.id);
        }
        templates.placeholders().get()
    });
    println!(
        "visible fields={}",
        context.table_fields().visible_fields().get().len()
    );
    println!("saved queries={:?}", context.saved_queries().names().get());
    println!("notifications={:?}", notifier.messages());

    context.dispose();
    Ok(())
}
