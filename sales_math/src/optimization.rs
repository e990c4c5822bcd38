//! Bounded Nelder-Mead simplex minimisation

use crate::{MathError, Result};

/// Tuning knobs for [`nelder_mead`]
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations
    pub max_iter: usize,
    /// Stop once the spread of objective values (or simplex size) drops below this
    pub tolerance: f64,
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Relative size of the initial simplex
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Outcome of a minimisation
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found
    pub optimal_point: Vec<f64>,
    /// Objective value at `optimal_point`
    pub optimal_value: f64,
    /// Iterations performed
    pub iterations: usize,
    /// Whether the tolerance was reached before `max_iter`
    pub converged: bool,
}

fn clamp_to_bounds(point: &mut [f64], bounds: Option<&[(f64, f64)]>) {
    if let Some(bounds) = bounds {
        for (x, (lo, hi)) in point.iter_mut().zip(bounds) {
            *x = x.clamp(*lo, *hi);
        }
    }
}

/// Move from `from` through `towards` by `coefficient`
fn step(from: &[f64], towards: &[f64], coefficient: f64) -> Vec<f64> {
    from.iter()
        .zip(towards)
        .map(|(f, t)| f + coefficient * (t - f))
        .collect()
}

/// Minimise `objective` starting at `initial`.
///
/// Every candidate point is clamped into `bounds` before evaluation.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: &NelderMeadConfig,
) -> Result<NelderMeadResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return Err(MathError::InvalidInput(
            "Cannot optimise over zero parameters".to_string(),
        ));
    }
    if let Some(bounds) = bounds {
        if bounds.len() != n {
            return Err(MathError::InvalidInput(format!(
                "Expected {} bounds, got {}",
                n,
                bounds.len()
            )));
        }
    }

    let mut start = initial.to_vec();
    clamp_to_bounds(&mut start, bounds);

    let mut simplex = Vec::with_capacity(n + 1);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        vertex[i] += if start[i].abs() > 1e-10 {
            config.initial_step * start[i].abs()
        } else {
            config.initial_step
        };
        clamp_to_bounds(&mut vertex, bounds);
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let mut centroid = vec![0.0; n];
        for (idx, vertex) in simplex.iter().enumerate() {
            if idx != worst {
                for (c, v) in centroid.iter_mut().zip(vertex) {
                    *c += v / n as f64;
                }
            }
        }

        if (values[worst] - values[best]).abs() < config.tolerance {
            converged = true;
            break;
        }
        let size = simplex
            .iter()
            .map(|v| {
                v.iter()
                    .zip(&centroid)
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0, f64::max);
        if size < config.tolerance {
            converged = true;
            break;
        }

        // Reflection
        let mut reflected = step(&centroid, &simplex[worst], -config.alpha);
        clamp_to_bounds(&mut reflected, bounds);
        let reflected_value = objective(&reflected);

        if reflected_value < values[best] {
            // Expansion
            let mut expanded = step(&centroid, &reflected, config.gamma);
            clamp_to_bounds(&mut expanded, bounds);
            let expanded_value = objective(&expanded);
            if expanded_value < reflected_value {
                simplex[worst] = expanded;
                values[worst] = expanded_value;
            } else {
                simplex[worst] = reflected;
                values[worst] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = reflected_value;
            continue;
        }

        // Contraction, outside or inside depending on the reflected value
        let (target, target_value) = if reflected_value < values[worst] {
            (reflected.clone(), reflected_value)
        } else {
            (simplex[worst].clone(), values[worst])
        };
        let mut contracted = step(&centroid, &target, config.rho);
        clamp_to_bounds(&mut contracted, bounds);
        let contracted_value = objective(&contracted);
        if contracted_value < target_value {
            simplex[worst] = contracted;
            values[worst] = contracted_value;
            continue;
        }

        // Shrink towards the best vertex
        let anchor = simplex[best].clone();
        for idx in 0..=n {
            if idx != best {
                let mut shrunk = step(&anchor, &simplex[idx], config.sigma);
                clamp_to_bounds(&mut shrunk, bounds);
                values[idx] = objective(&shrunk);
                simplex[idx] = shrunk;
            }
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    Ok(NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    })
}
