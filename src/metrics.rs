use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("dashboard_polls_total").absolute(0);
    counter!("dashboard_poll_failures_total").absolute(0);
    counter!("proposal_actions_total", "action" => "accept").absolute(0);
    counter!("proposal_actions_total", "action" => "decline").absolute(0);
    counter!("proposal_action_failures_total").absolute(0);
    for decision in ["proceed", "loading", "redirect", "render"] {
        counter!("gate_decisions_total", "decision" => decision).absolute(0);
    }

    gauge!("dashboard_assets").set(0.0);

    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally. Used where a
/// render target is needed without claiming the process-wide recorder.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
