use crate::types::ExperimentMode;

#[derive(Clone, Copy, Debug)]
pub struct ExperimentTheory {
    pub title: &'static str,
    pub tagline: &'static str,
    pub mechanism: &'static str,
    pub equation: &'static str,
    pub hypothesis: &'static str,
    pub citation: &'static str,
    pub controls: &'static [&'static str],
    /// Label for the chart's `value` axis.
    pub value_label: &'static str,
    pub threshold_label: &'static str,
}

pub fn theory(mode: ExperimentMode) -> &'static ExperimentTheory {
    match mode {
        ExperimentMode::A => &SUPERRADIANCE,
        ExperimentMode::B => &GRAVITY,
        ExperimentMode::C => &ENTRAINMENT,
    }
}

static SUPERRADIANCE: ExperimentTheory = ExperimentTheory {
    title: "Anesthetic Inhibition of Superradiance",
    tagline: "Testing whether consciousness requires collective superradiance \
              in tryptophan networks.",
    mechanism: "Dipole detuning via hydrophobic binding",
    equation: "g²(τ) = 1 + exp(-|τ|/τ_c)",
    hypothesis: "Anesthetics act as decoherence catalysts, collapsing the collective \
                 superradiant state (g² > 1) to a classical Poissonian state (g² = 1).",
    citation: "Babcock et al. (2024), Kurian et al. (2025)",
    controls: &["Temperature (310K)", "UV Flux", "Microtubule Density"],
    value_label: "g² ratio",
    threshold_label: "Poissonian (Random)",
};

static GRAVITY: ExperimentTheory = ExperimentTheory {
    title: "Gravitational Decoherence (Penrose Limit)",
    tagline: "Isolating the gravitational self-energy term by removing thermal and seismic noise.",
    mechanism: "Space-time geometry superposition",
    equation: "τ ≈ ℏ / E_G",
    hypothesis: "Biological systems suppress thermal noise long enough for gravitational \
                 self-energy to induce state reduction.",
    citation: "Penrose (1996), Folman et al. (2025)",
    controls: &["Seismic Isolation (>60dB)", "Magnetic Shielding", "Microgravity"],
    value_label: "Coherence Time (ms)",
    threshold_label: "Libet Window (0.5s)",
};

static ENTRAINMENT: ExperimentTheory = ExperimentTheory {
    title: "Bio-Magnetic Entrainment",
    tagline: "Validating cardiac entrainment via Earth-ionosphere resonance frequencies.",
    mechanism: "Stochastic resonance and CISS rectification",
    equation: "HRV_max ∝ exp(-(f - f_Schumann)²)",
    hypothesis: "The cardiac rhythm uses environmental zeitgebers (7.83 Hz) to phase-lock \
                 the organism's state via hemodynamic rectification.",
    citation: "Nelson (2025), McCraty (2025)",
    controls: &["Field Intensity (pT)", "Frequency Stability", "Shielding"],
    value_label: "HRV (ms)",
    threshold_label: "Coherence Threshold",
};
