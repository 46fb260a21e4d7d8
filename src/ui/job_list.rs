// Job List
// One row per submitted sync job, newest last

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::Styles;
use crate::operations::{JobOutcome, JobRecord, JobStatus};
use crate::utilities::shorten_middle;

pub fn render_job_list(f: &mut Frame, records: &[JobRecord], scroll: usize, area: Rect) {
    let running = records.iter().filter(|r| r.is_running()).count();
    let title = format!(" Jobs ({} running, {} total) ", running, records.len());

    let path_width = (area.width.saturating_sub(30) / 2).max(8) as usize;

    let items: Vec<ListItem> = if records.is_empty() {
        vec![ListItem::new(Span::styled(" No sync jobs yet", Styles::muted()))]
    } else {
        records
            .iter()
            .skip(scroll)
            .map(|record| ListItem::new(job_line(record, path_width)))
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_unfocused())
            .title(Span::styled(title, Styles::title_unfocused())),
    );
    f.render_widget(list, area);
}

fn job_line(record: &JobRecord, path_width: usize) -> Line<'static> {
    let (icon, style) = match record.status() {
        JobStatus::Running => ("⟳", Styles::job_running()),
        JobStatus::Succeeded => ("✓", Styles::job_succeeded()),
        JobStatus::Failed => ("✗", Styles::job_failed()),
    };

    let request = record.request();
    let mut spans = vec![
        Span::styled(format!(" {} {:<5}", icon, record.id().to_string()), style),
        Span::raw(shorten_middle(&request.source.display().to_string(), path_width)),
        Span::styled(" → ", Styles::muted()),
        Span::raw(shorten_middle(&request.target.display().to_string(), path_width)),
        Span::styled(format!("  {:.1}s", record.elapsed().as_secs_f64()), Styles::muted()),
    ];

    match record.outcome() {
        Some(JobOutcome::Success(report)) => {
            spans.push(Span::styled(format!("  {}", report.summary()), Styles::muted()));
        }
        Some(JobOutcome::Failure(failure)) => {
            spans.push(Span::styled(format!("  {}", failure.message), Styles::job_failed()));
        }
        None => {
            spans.push(Span::styled(format!("  {}", record.worker_name()), Styles::muted()));
        }
    }

    Line::from(spans)
}
