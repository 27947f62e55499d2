//! Single-shot analysis pipeline: fit, attribute, estimate, render, report.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use causeway_gcm::{
    arrow_strength, average_causal_effect, intrinsic_causal_influence, render_graph,
    render_influence_bars, Dataset, EffectPair, StructuralCausalModel,
};
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::format::build_summary;
use crate::normalize::to_percentages;
use crate::report::AnalysisReport;
use crate::topology;

const GRAPH_PLOT: &str = "causal_graph.png";
const INFLUENCE_PLOT: &str = "intrinsic_influence.png";

/// Run the full attribution pipeline over one snapshot of observations.
///
/// The run is deterministic for a given `config.seed` and dataset: every
/// sampling step draws from a single seeded generator in a fixed order.
pub fn run_analysis(config: &AgentConfig, data: &Dataset) -> Result<AnalysisReport, AgentError> {
    let graph = topology::engine_graph()?;
    info!(
        target_node = %config.target,
        rows = data.n_rows(),
        seed = config.seed,
        "Fitting structural causal model"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let scm = StructuralCausalModel::fit(graph, data)?;

    let raw_arrows = arrow_strength(&scm, &config.target, &config.influence, &mut rng)?;
    let raw_influence =
        intrinsic_causal_influence(&scm, &config.target, &config.influence, &mut rng)?;
    let effects = estimate_effects(config, &scm, &mut rng)?;

    let arrow_pct = to_percentages(&raw_arrows);
    let node_pct = to_percentages(&raw_influence);
    let summary = build_summary(&config.target, &arrow_pct, &node_pct, &effects);

    let plot_paths = if config.render_plots {
        render_plots(config, &scm, &node_pct)?
    } else {
        Vec::new()
    };

    info!(
        arrows = arrow_pct.len(),
        nodes = node_pct.len(),
        effects = effects.len(),
        "Analysis complete"
    );

    Ok(AnalysisReport {
        run_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        samples_used: data.n_rows(),
        arrow_strength_pct: arrow_pct
            .iter()
            .map(|(arrow, pct)| (arrow.to_string(), *pct))
            .collect(),
        intrinsic_influence_pct: node_pct,
        average_effects: effects
            .iter()
            .map(|(pair, effect)| (pair.to_string(), *effect))
            .collect(),
        summary,
        plot_paths,
    })
}

/// Estimate the configured treatment/outcome pairs.
///
/// Strict mode propagates the first failure. Lenient mode records the pair
/// as unavailable and keeps going. A non-finite estimate is always recorded
/// as unavailable; NaN never reaches a payload.
fn estimate_effects(
    config: &AgentConfig,
    scm: &StructuralCausalModel,
    rng: &mut ChaCha8Rng,
) -> Result<BTreeMap<EffectPair, Option<f64>>, AgentError> {
    let mut effects = BTreeMap::new();
    for pair in &config.effect_pairs {
        let estimate = average_causal_effect(
            scm,
            &pair.treatment,
            &pair.outcome,
            &config.influence,
            rng,
        );
        match estimate {
            Ok(value) if value.is_finite() => {
                debug!(pair = %pair, effect = value, "Estimated average causal effect");
                effects.insert(pair.clone(), Some(value));
            }
            Ok(_) => {
                warn!(pair = %pair, "Effect estimate was not finite, reporting unavailable");
                effects.insert(pair.clone(), None);
            }
            Err(err) if config.suppress_effect_errors => {
                warn!(pair = %pair, error = %err, "Effect estimation failed, reporting unavailable");
                effects.insert(pair.clone(), None);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(effects)
}

fn render_plots(
    config: &AgentConfig,
    scm: &StructuralCausalModel,
    node_pct: &BTreeMap<String, f64>,
) -> Result<Vec<PathBuf>, AgentError> {
    fs::create_dir_all(&config.out_dir).map_err(|e| AgentError::OutputDir {
        path: config.out_dir.display().to_string(),
        reason: e.to_string(),
    })?;
    let graph_path = config.out_dir.join(GRAPH_PLOT);
    render_graph(scm.graph(), &graph_path)?;
    let bars: Vec<(String, f64)> = node_pct
        .iter()
        .map(|(name, pct)| (name.clone(), *pct))
        .collect();
    let bars_path = config.out_dir.join(INFLUENCE_PLOT);
    render_influence_bars("Intrinsic causal influence", &bars, &bars_path)?;
    debug!(
        graph = %graph_path.display(),
        bars = %bars_path.display(),
        "Rendered diagnostic plots"
    );
    Ok(vec![graph_path, bars_path])
}
