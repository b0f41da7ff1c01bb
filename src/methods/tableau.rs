//! Butcher tableaux of explicit Runge-Kutta methods.

use serde::{Deserialize, Serialize};

use crate::{Float, error::Error};

/// Coefficients of an explicit `s`-stage Runge-Kutta method.
///
/// ```text
///  0      |
///  a[0]   | b[0][0]
///  a[1]   | b[1][0]  b[1][1]
///  ...    | ...
///  a[s-2] | b[s-2][0] ...    b[s-2][s-2]
/// --------+---------------------------------
///         | p[0]      p[1]   ...   p[s-1]
/// ```
///
/// `a` are the node offsets, `b` the lower-triangular stage coupling and `p`
/// the quadrature weights. The shape is checked once in [`Tableau::new`],
/// deserialization included; afterwards the tableau is immutable and can be
/// shared between runs and threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTableau", into = "RawTableau")]
pub struct Tableau {
    stage_count: usize,
    node_offsets: Vec<Float>,
    coupling: Vec<Vec<Float>>,
    weights: Vec<Float>,
    order: u32,
}

/// Unchecked serde form of [`Tableau`].
#[derive(Serialize, Deserialize)]
struct RawTableau {
    stage_count: usize,
    node_offsets: Vec<Float>,
    coupling: Vec<Vec<Float>>,
    weights: Vec<Float>,
    order: u32,
}

impl TryFrom<RawTableau> for Tableau {
    type Error = Error;

    fn try_from(raw: RawTableau) -> Result<Self, Self::Error> {
        Tableau::new(
            raw.stage_count,
            raw.node_offsets,
            raw.coupling,
            raw.weights,
            raw.order,
        )
    }
}

impl From<Tableau> for RawTableau {
    fn from(t: Tableau) -> Self {
        Self {
            stage_count: t.stage_count,
            node_offsets: t.node_offsets,
            coupling: t.coupling,
            weights: t.weights,
            order: t.order,
        }
    }
}

impl Tableau {
    /// Build a tableau, rejecting any shape that does not describe an
    /// explicit `stage_count`-stage method.
    pub fn new(
        stage_count: usize,
        node_offsets: Vec<Float>,
        coupling: Vec<Vec<Float>>,
        weights: Vec<Float>,
        order: u32,
    ) -> Result<Self, Error> {
        if stage_count == 0 {
            return Err(Error::MalformedTableau(
                "stage count must be at least 1".into(),
            ));
        }
        if node_offsets.len() != stage_count - 1 {
            return Err(Error::MalformedTableau(format!(
                "expected {} node offsets, got {}",
                stage_count - 1,
                node_offsets.len()
            )));
        }
        if coupling.len() != stage_count - 1 {
            return Err(Error::MalformedTableau(format!(
                "expected {} coupling rows, got {}",
                stage_count - 1,
                coupling.len()
            )));
        }
        if let Some((i, row)) = coupling
            .iter()
            .enumerate()
            .find(|(i, row)| row.len() != i + 1)
        {
            return Err(Error::MalformedTableau(format!(
                "coupling row {} must have {} entries, got {}",
                i + 1,
                i + 1,
                row.len()
            )));
        }
        if weights.len() != stage_count {
            return Err(Error::MalformedTableau(format!(
                "expected {} weights, got {}",
                stage_count,
                weights.len()
            )));
        }
        if order == 0 {
            return Err(Error::MalformedTableau("order must be at least 1".into()));
        }
        let finite = node_offsets
            .iter()
            .chain(coupling.iter().flatten())
            .chain(&weights)
            .all(|c| c.is_finite());
        if !finite {
            return Err(Error::MalformedTableau(
                "coefficients must be finite".into(),
            ));
        }

        Ok(Self {
            stage_count,
            node_offsets,
            coupling,
            weights,
            order,
        })
    }

    /// Explicit Euler, order 1.
    pub fn euler() -> Self {
        Self::preset(1, &[], &[], &[1.0], 1)
    }

    /// Heun's method (explicit trapezoid), order 2.
    pub fn heun() -> Self {
        Self::preset(2, &[1.0], &[&[1.0]], &[0.5, 0.5], 2)
    }

    /// Explicit midpoint method, order 2.
    pub fn midpoint() -> Self {
        Self::preset(2, &[0.5], &[&[0.5]], &[0.0, 1.0], 2)
    }

    /// Kutta's third-order method.
    pub fn kutta3() -> Self {
        Self::preset(
            3,
            &[0.5, 1.0],
            &[&[0.5], &[-1.0, 2.0]],
            &[1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0],
            3,
        )
    }

    /// Classical fourth-order Runge-Kutta.
    pub fn rk4() -> Self {
        Self::preset(
            4,
            &[0.5, 0.5, 1.0],
            &[&[0.5], &[0.0, 0.5], &[0.0, 0.0, 1.0]],
            &[1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            4,
        )
    }

    /// Look up a preset by name (`euler`, `heun`, `midpoint`, `kutta3`, `rk4`).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "euler" => Some(Self::euler()),
            "heun" | "rk2" => Some(Self::heun()),
            "midpoint" => Some(Self::midpoint()),
            "kutta3" | "rk3" => Some(Self::kutta3()),
            "rk4" => Some(Self::rk4()),
            _ => None,
        }
    }

    // Presets are well-formed by construction.
    fn preset(s: usize, a: &[Float], b: &[&[Float]], p: &[Float], order: u32) -> Self {
        Self {
            stage_count: s,
            node_offsets: a.to_vec(),
            coupling: b.iter().map(|row| row.to_vec()).collect(),
            weights: p.to_vec(),
            order,
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    pub fn node_offsets(&self) -> &[Float] {
        &self.node_offsets
    }

    pub fn coupling(&self) -> &[Vec<Float>] {
        &self.coupling
    }

    pub fn weights(&self) -> &[Float] {
        &self.weights
    }

    /// Order `p` used by Runge's rule.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Denominator `2^p - 1` of Runge's error estimate.
    pub fn runge_denominator(&self) -> Float {
        (2.0 as Float).powi(self.order as i32) - 1.0
    }

    /// Whether the weights sum to one. Not enforced at construction.
    pub fn is_consistent(&self) -> bool {
        (self.weights.iter().sum::<Float>() - 1.0).abs() <= 1e-12
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid_and_consistent() {
        for t in [
            Tableau::euler(),
            Tableau::heun(),
            Tableau::midpoint(),
            Tableau::kutta3(),
            Tableau::rk4(),
        ] {
            let rebuilt = Tableau::new(
                t.stage_count(),
                t.node_offsets().to_vec(),
                t.coupling().to_vec(),
                t.weights().to_vec(),
                t.order(),
            )
            .unwrap();
            assert_eq!(rebuilt, t);
            assert!(t.is_consistent());
        }
    }

    #[test]
    fn rejects_wrong_node_offset_count() {
        let err = Tableau::new(2, vec![], vec![vec![1.0]], vec![0.5, 0.5], 2).unwrap_err();
        assert!(matches!(err, Error::MalformedTableau(_)));
    }

    #[test]
    fn rejects_ragged_coupling() {
        let err = Tableau::new(
            3,
            vec![0.5, 1.0],
            vec![vec![0.5], vec![2.0]],
            vec![0.2, 0.6, 0.2],
            3,
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::MalformedTableau("coupling row 2 must have 2 entries, got 1".into())
        );
    }

    #[test]
    fn rejects_wrong_weight_count_and_zero_stages() {
        assert!(Tableau::new(2, vec![1.0], vec![vec![1.0]], vec![1.0], 2).is_err());
        assert!(Tableau::new(0, vec![], vec![], vec![], 1).is_err());
        assert!(Tableau::new(1, vec![], vec![], vec![1.0], 0).is_err());
        assert!(Tableau::new(1, vec![], vec![], vec![Float::NAN], 1).is_err());
    }

    #[test]
    fn inconsistent_weights_are_accepted() {
        let t = Tableau::new(2, vec![1.0], vec![vec![1.0]], vec![0.5, 0.6], 2).unwrap();
        assert!(!t.is_consistent());
    }

    #[test]
    fn deserialization_is_validated() {
        let json = r#"{"stage_count":2,"node_offsets":[1.0],"coupling":[],"weights":[1.0],"order":0}"#;
        let err = serde_json::from_str::<Tableau>(json).unwrap_err();
        assert!(err.to_string().contains("malformed tableau"), "{err}");

        let json = r#"{"stage_count":2,"node_offsets":[1.0],"coupling":[[1.0]],"weights":[0.5,0.5],"order":2}"#;
        let t: Tableau = serde_json::from_str(json).unwrap();
        assert_eq!(t, Tableau::heun());

        let text = serde_json::to_string(&Tableau::rk4()).unwrap();
        assert_eq!(serde_json::from_str::<Tableau>(&text).unwrap(), Tableau::rk4());
    }

    #[test]
    fn runge_denominator_follows_order() {
        assert_eq!(Tableau::rk4().runge_denominator(), 15.0);
        assert_eq!(Tableau::heun().runge_denominator(), 3.0);
        assert_eq!(Tableau::by_name("RK4"), Some(Tableau::rk4()));
        assert!(Tableau::by_name("dopri5").is_none());
    }
}
