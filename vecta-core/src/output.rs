// vecta-core - Output side-table
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Everything a run produces besides its value: the print log, images,
//! plots, graphs and slider inputs. A renderer reads this table after (or
//! during) a run.

use std::collections::BTreeMap;

use serde::Serialize;
use vecta_parser::TextPosition;

use crate::value::Value;

/// One entry of the print log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintEntry {
    /// Source text of the printed expression.
    pub source: String,
    pub position: TextPosition,
    pub value: Value,
}

/// A raster image. `pixels` holds `width * height` values, or three times
/// that when `is_rgb` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<f64>,
    pub is_rgb: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

/// A function sampled over a rectangle, row-major with `resolution`
/// samples per axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub function: String,
    pub x: (f64, f64),
    pub y: (f64, f64),
    pub resolution: usize,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plot {
    pub lines: Vec<Line>,
    pub heatmaps: Vec<Heatmap>,
}

/// Directed graph as adjacency lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub adjacency: Vec<Vec<usize>>,
}

/// A slider declared by the program. Its value survives re-runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliderInput {
    pub name: String,
    pub lo: f64,
    pub hi: f64,
    pub value: f64,
    pub step: f64,
    /// Declared by the current run.
    #[serde(skip)]
    pub seen: bool,
}

/// The output side-table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outputs {
    pub prints: Vec<PrintEntry>,
    pub images: Vec<Image>,
    pub plots: BTreeMap<usize, Plot>,
    pub graphs: BTreeMap<usize, Graph>,
    pub inputs: BTreeMap<String, SliderInput>,
}

impl Outputs {
    /// A fresh table that keeps only `previous`'s slider inputs, marked as
    /// not yet seen by this run.
    pub fn carried_from(previous: &Outputs) -> Self {
        let inputs = previous
            .inputs
            .iter()
            .map(|(name, input)| {
                let mut input = input.clone();
                input.seen = false;
                (name.clone(), input)
            })
            .collect();
        Outputs {
            inputs,
            ..Outputs::default()
        }
    }

    /// Drop inputs the current run did not declare.
    pub fn prune_inputs(&mut self) {
        self.inputs.retain(|_, input| input.seen);
    }

    pub fn plot_mut(&mut self, index: usize) -> &mut Plot {
        self.plots.entry(index).or_default()
    }

    /// Declare slider `name` for this run and return its current value.
    ///
    /// A carried value is kept when it still lies in `[lo, hi]`, otherwise
    /// the slider restarts at `lo`.
    pub fn declare_slider(&mut self, name: &str, lo: f64, hi: f64, step: f64) -> f64 {
        let (min, max) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let value = match self.inputs.get(name) {
            Some(existing) if (min..=max).contains(&existing.value) => existing.value,
            _ => lo,
        };
        self.inputs.insert(
            name.to_string(),
            SliderInput {
                name: name.to_string(),
                lo,
                hi,
                value,
                step,
                seen: true,
            },
        );
        value
    }

    /// Move a slider, clamped to its range. Returns false for an unknown name.
    pub fn set_input_value(&mut self, name: &str, value: f64) -> bool {
        match self.inputs.get_mut(name) {
            Some(input) => {
                let (min, max) = if input.lo <= input.hi {
                    (input.lo, input.hi)
                } else {
                    (input.hi, input.lo)
                };
                input.value = value.max(min).min(max);
                true
            }
            None => false,
        }
    }
}
