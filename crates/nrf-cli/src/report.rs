use nrfpairs::engine::config::AnalysisConfig;
use nrfpairs::engine::ranking::{RankedPair, RankedPairs};
use nrfpairs::workflows::analyze::{AnalysisResult, LineSet};
use std::fmt::Write;

/// Start line naming the detector and source energy windows.
pub fn search_banner(config: &AnalysisConfig) -> String {
    format!(
        "Looking for significant pairs of lines emitted between {}\nUsing a bremsstrahlung source from {}\n",
        config.detector_window, config.source_window
    )
}

fn pair_heading<T: RankedPair>(out: &mut String, kind: &str, ranked: &RankedPairs<T>) -> bool {
    if ranked.available() == 0 {
        let _ = writeln!(out, "\nNo {} pairs", kind);
        return false;
    }
    if ranked.is_partial() {
        let _ = writeln!(out, "\nOnly {} {} pairs found", ranked.available(), kind);
    } else if ranked.requested().is_none() {
        let _ = writeln!(out, "\nFound {} {} pairs", ranked.available(), kind);
    }
    let _ = writeln!(
        out,
        "The {} {} pairs with the largest minimum counts:",
        ranked.len(),
        kind
    );
    true
}

/// Ranked branched pairs: two gammas out of the same level.
pub fn branched_section(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if !pair_heading(&mut out, "branched", &result.branched) {
        return out;
    }
    let _ = writeln!(
        out,
        "   Isotope    σ_min[eV·b]  branch ratio   E_level[MeV]    E_gamma[MeV]       α_foil          α_ratio      counts"
    );
    for pair in result.branched.entries() {
        let Some((a, b)) = result.lines.pair(pair) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{}  {:10.3}  [{:4.2}, {:4.2}]  {:10.3}    [{:6.3}, {:6.3}]  [{:8.2}, {:8.2}]  {:7.3}  {:10.2}",
            a.isotope(),
            pair.sigma_min,
            a.params().branch_to_final,
            b.params().branch_to_final,
            pair.level_energy,
            pair.gamma_energies[0],
            pair.gamma_energies[1],
            a.alpha_foil(),
            b.alpha_foil(),
            pair.alpha_ratio,
            pair.count_min,
        );
    }
    out
}

/// Ranked neighbouring pairs: distinct levels closer than the threshold.
pub fn neighbouring_section(result: &AnalysisResult) -> String {
    let mut out = String::new();
    if !pair_heading(&mut out, "neighbouring", &result.neighbouring) {
        return out;
    }
    let _ = writeln!(
        out,
        "  Isotope_1   Isotope_2   strength_min   E_level[MeV]       E_gamma[MeV]       α_foil          α_ratio      counts"
    );
    for pair in result.neighbouring.entries() {
        let Some((a, b)) = result.lines.pair(pair) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{} {}  {:10.4}  [{:7.4}, {:7.4}]  [{:7.4}, {:7.4}]  [{:8.2}, {:8.2}]  {:7.3}  {:10.2}",
            a.isotope(),
            b.isotope(),
            pair.strength_min,
            a.level_energy(),
            b.level_energy(),
            a.gamma_energy(),
            b.gamma_energy(),
            a.alpha_foil(),
            b.alpha_foil(),
            pair.alpha_ratio,
            pair.count_min,
        );
    }
    out
}

/// One-paragraph account of line selection and normalization.
pub fn run_summary(set: &LineSet) -> String {
    let s = &set.selection;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Scanned {} database records: {} accepted, {} rejected ({} invalid width, {} zero branch, {} isotope not listed, {} outside detector window, {} outside source window).",
        s.scanned,
        s.accepted,
        s.rejected(),
        s.invalid_width,
        s.non_positive_branch,
        s.unlisted_isotope,
        s.outside_detector_window,
        s.outside_source_window,
    );
    if set.degenerate_count() > 0 {
        let _ = writeln!(
            out,
            "{} accepted line(s) are numerically degenerate and were left out of the ranking.",
            set.degenerate_count()
        );
    }
    match (set.source_strength, set.reference_isotope) {
        (Some(strength), Some(isotope)) => {
            let _ = writeln!(
                out,
                "Source strength {:.4e}: strongest line of {} scaled to 10000 counts.",
                strength, isotope
            );
        }
        _ => {
            let _ = writeln!(out, "No usable lines; counts were not normalized.");
        }
    }
    out
}

/// Accepted lines with their derived quantities.
pub fn lines_table(set: &LineSet) -> String {
    let mut out = String::new();
    if set.lines.is_empty() {
        let _ = writeln!(out, "\nNo lines accepted");
        return out;
    }
    let _ = writeln!(
        out,
        "\n index    Isotope   E_level[MeV]  E_gamma[MeV]  b_final  b_ground   σ_foil[eV·b]      α_foil      counts  status"
    );
    for line in &set.lines {
        let params = line.params();
        let status = match line.degeneracy() {
            Some(reason) => reason.to_string(),
            None => "ok".to_string(),
        };
        let _ = writeln!(
            out,
            "{:6}  {}  {:12.4}  {:12.4}  {:7.3}  {:8.3}  {:13.4}  {:10.3}  {:10.2}  {}",
            line.index(),
            line.isotope(),
            line.level_energy(),
            line.gamma_energy(),
            params.branch_to_final,
            params.branch_to_ground,
            line.integrated_foil(),
            line.alpha_foil(),
            line.counts(),
            status,
        );
    }
    out
}
