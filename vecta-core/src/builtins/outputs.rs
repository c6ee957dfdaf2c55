// vecta-core - Builtins that write the output side-table
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! print, plot, heatmap, image, graph, slider

use num_traits::ToPrimitive;

use super::{
    ANY, ARRAY, BuiltinHost, NUMBER, Param, Registry, arg, number_arg, optional_number, opt,
    req, slot_arg,
};
use crate::error::{Error, Result};
use crate::output::{Graph, Heatmap, Image, Line};
use crate::value::{FunctionRef, Value, ValueKind};

pub(super) fn register(r: &mut Registry) {
    const PRINT: &[Param] = &[req("value", ANY)];
    const PLOT: &[Param] = &[req("xs", ARRAY), req("ys", ARRAY), opt("index", NUMBER)];
    const HEATMAP: &[Param] = &[
        req("f", &[ValueKind::Function]),
        req("x", &[ValueKind::Range]),
        req("y", &[ValueKind::Range]),
        opt("index", NUMBER),
    ];
    const IMAGE: &[Param] = &[req("pixels", ARRAY)];
    const GRAPH: &[Param] = &[req("adjacency", &[ValueKind::List]), opt("index", NUMBER)];
    const SLIDER: &[Param] = &[
        req("name", &[ValueKind::String]),
        req("lo", NUMBER),
        req("hi", NUMBER),
        opt("step", NUMBER),
    ];

    r.add("print", PRINT, print);
    r.add("plot", PLOT, plot);
    r.add("heatmap", HEATMAP, heatmap);
    r.add("image", IMAGE, image);
    r.add("graph", GRAPH, graph);
    r.add("slider", SLIDER, slider);
}

fn print(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let value = arg("print", args, 0)?;
    host.record_print(value);
    Ok(value.clone())
}

fn numbers(function: &'static str, args: &[Value], i: usize) -> Result<Vec<f64>> {
    arg(function, args, i)?
        .to_numbers()
        .map_err(|e| Error::builtin_arg(function, i, e.to_string()))
}

fn plot(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let xs = numbers("plot", args, 0)?;
    let ys = numbers("plot", args, 1)?;
    if xs.len() != ys.len() {
        return Err(Error::builtin_arg(
            "plot",
            1,
            format!("expected {} y values to match xs, got {}", xs.len(), ys.len()),
        ));
    }
    let index = slot_arg("plot", args, 2)?;
    host.outputs().plot_mut(index).lines.push(Line { xs, ys });
    Ok(arg("plot", args, 1)?.clone())
}

fn heatmap(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let function = match arg("heatmap", args, 0)? {
        Value::Function(f) => f.clone(),
        other => {
            return Err(Error::builtin_arg(
                "heatmap",
                0,
                format!("expected Function, got {}", other.kind()),
            ));
        }
    };
    let (x, y) = match (arg("heatmap", args, 1)?, arg("heatmap", args, 2)?) {
        (Value::Range { lo: x0, hi: x1 }, Value::Range { lo: y0, hi: y1 }) => {
            ((*x0, *x1), (*y0, *y1))
        }
        _ => return Err(Error::builtin("heatmap", "x and y must be intervals")),
    };
    let index = slot_arg("heatmap", args, 3)?;
    let resolution = host.config().heatmap_resolution.max(1);

    let sampled = match host.evaluator() {
        Some(mut evaluator) => Some(sample(&mut *evaluator, &function, x, y, resolution)?),
        None => None,
    };
    let Some(values) = sampled else {
        host.warn("heatmap functions are not evaluated while debugging".to_string());
        return Ok(Value::Function(function));
    };

    host.outputs().plot_mut(index).heatmaps.push(Heatmap {
        function: function.name().to_string(),
        x,
        y,
        resolution,
        values,
    });
    Ok(Value::Function(function))
}

/// Evaluate `function` at the centre of each cell of a `resolution` grid,
/// row by row from `y.0`.
fn sample(
    evaluator: &mut dyn super::FunctionEvaluator,
    function: &FunctionRef,
    x: (f64, f64),
    y: (f64, f64),
    resolution: usize,
) -> Result<Vec<f64>> {
    let cell = |range: (f64, f64), i: usize| {
        range.0 + (range.1 - range.0) * (i as f64 + 0.5) / resolution as f64
    };
    let mut values = Vec::with_capacity(resolution * resolution);
    for row in 0..resolution {
        for col in 0..resolution {
            let args = vec![Value::Number(cell(x, col)), Value::Number(cell(y, row))];
            match evaluator.call_function(function, args)? {
                Value::Number(n) => values.push(n),
                other => {
                    return Err(Error::builtin_arg(
                        "heatmap",
                        0,
                        format!("function must return a Number, got {}", other.kind()),
                    ));
                }
            }
        }
    }
    Ok(values)
}

fn image(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let pixels = arg("image", args, 0)?;
    let m = pixels
        .to_matrix()
        .map_err(|e| Error::builtin_arg("image", 0, e.to_string()))?;
    let (height, width, is_rgb) = match m.shape() {
        [h, w] => (*h, *w, false),
        [h, w, 3] => (*h, *w, true),
        shape => {
            return Err(Error::builtin_arg(
                "image",
                0,
                format!(
                    "expected rows x cols or rows x cols x 3 pixels, got shape {:?}",
                    shape
                ),
            ));
        }
    };
    host.outputs().images.push(Image {
        width,
        height,
        pixels: m.to_vec(),
        is_rgb,
    });
    Ok(pixels.clone())
}

fn graph(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let adjacency_value = arg("graph", args, 0)?;
    let Value::List(rows) = adjacency_value else {
        return Err(Error::builtin_arg("graph", 0, "expected a List of neighbour lists"));
    };
    let node_count = rows.len();
    let mut adjacency = Vec::with_capacity(node_count);
    for row in rows {
        let neighbours = row
            .to_numbers()
            .map_err(|e| Error::builtin_arg("graph", 0, e.to_string()))?;
        let neighbours = neighbours
            .into_iter()
            .map(|n| match n.to_usize() {
                Some(i) if n.fract() == 0.0 && i < node_count => Ok(i),
                _ => Err(Error::builtin_arg(
                    "graph",
                    0,
                    format!("{} is not a node of a graph with {} nodes", n, node_count),
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        adjacency.push(neighbours);
    }
    let index = slot_arg("graph", args, 1)?;
    host.outputs().graphs.insert(index, Graph { adjacency });
    Ok(adjacency_value.clone())
}

fn slider(host: &mut dyn BuiltinHost, args: &[Value]) -> Result<Value> {
    let name = match arg("slider", args, 0)? {
        Value::String(s) => s.to_string(),
        other => {
            return Err(Error::builtin_arg(
                "slider",
                0,
                format!("expected String, got {}", other.kind()),
            ));
        }
    };
    let lo = number_arg("slider", args, 1)?;
    let hi = number_arg("slider", args, 2)?;
    for (i, bound) in [(1, lo), (2, hi)] {
        if !bound.is_finite() {
            return Err(Error::builtin_arg(
                "slider",
                i,
                format!("bounds must be finite, got {}", bound),
            ));
        }
    }
    let step = optional_number(args, 3).unwrap_or((hi - lo).abs() / 100.0);

    let outputs = host.outputs();
    if outputs.inputs.get(&name).is_some_and(|input| input.seen) {
        return Err(Error::builtin_arg(
            "slider",
            0,
            format!("slider '{}' is declared more than once", name),
        ));
    }
    Ok(Value::Number(outputs.declare_slider(&name, lo, hi, step)))
}
