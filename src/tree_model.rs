use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ModelError;
use crate::nn_model::{sigmoid, softmax_in_place};
use crate::predict::Classifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    SoftProb,
    Logistic,
}

#[derive(Debug, Clone)]
struct Tree {
    left: Vec<i32>,
    right: Vec<i32>,
    split_index: Vec<usize>,
    split_condition: Vec<f64>,
    default_left: Vec<bool>,
    class: usize,
}

impl Tree {
    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.left[node];
            if left < 0 {
                return self.split_condition[node];
            }
            let value = row.get(self.split_index[node]).copied().unwrap_or(f64::NAN);
            let go_left = if value.is_nan() {
                self.default_left[node]
            } else {
                value < self.split_condition[node]
            };
            node = if go_left {
                left as usize
            } else {
                self.right[node] as usize
            };
        }
    }
}

/// Gradient-boosted trees read from XGBoost's JSON model format.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    trees: Vec<Tree>,
    num_class: usize,
    num_feature: usize,
    base_score: f64,
    objective: Objective,
}

// -- XGBoost JSON layout (only the fields inference needs) --

#[derive(Debug, Deserialize)]
struct XgbFile {
    learner: XgbLearner,
}

#[derive(Debug, Deserialize)]
struct XgbLearner {
    gradient_booster: XgbBooster,
    learner_model_param: XgbModelParam,
    objective: XgbObjective,
}

#[derive(Debug, Deserialize)]
struct XgbBooster {
    model: XgbTrees,
}

#[derive(Debug, Deserialize)]
struct XgbTrees {
    trees: Vec<XgbTree>,
    #[serde(default)]
    tree_info: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct XgbTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<usize>,
    split_conditions: Vec<f64>,
    default_left: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct XgbModelParam {
    #[serde(default)]
    base_score: Option<String>,
    #[serde(default)]
    num_class: Option<String>,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct XgbObjective {
    name: String,
}

impl TreeEnsemble {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let file: XgbFile = serde_json::from_str(raw)?;
        let learner = file.learner;
        let params = learner.learner_model_param;

        let objective = match learner.objective.name.as_str() {
            "multi:softprob" | "multi:softmax" => Objective::SoftProb,
            "binary:logistic" => Objective::Logistic,
            other => {
                return Err(ModelError::Invalid(format!("unsupported objective {other}")));
            }
        };
        let num_class = match objective {
            Objective::SoftProb => parse_param(params.num_class.as_deref())
                .map(|v| v as usize)
                .filter(|v| *v >= 2)
                .ok_or_else(|| ModelError::Invalid("num_class missing".to_string()))?,
            Objective::Logistic => 2,
        };
        let num_feature = parse_param(params.num_feature.as_deref()).unwrap_or(0.0) as usize;
        let base_score = parse_param(params.base_score.as_deref()).unwrap_or(0.5);

        let raw_trees = learner.gradient_booster.model.trees;
        let tree_info = learner.gradient_booster.model.tree_info;
        let mut trees = Vec::with_capacity(raw_trees.len());
        for (idx, t) in raw_trees.into_iter().enumerate() {
            let class = match objective {
                Objective::SoftProb => tree_info.get(idx).copied().unwrap_or(idx % num_class),
                Objective::Logistic => 0,
            };
            trees.push(build_tree(idx, t, class, num_class)?);
        }
        if trees.is_empty() {
            return Err(ModelError::Invalid("model has no trees".to_string()));
        }

        Ok(Self {
            trees,
            num_class,
            num_feature,
            base_score,
            objective,
        })
    }

    pub fn num_class(&self) -> usize {
        self.num_class
    }

    fn margins(&self, row: &[f64]) -> Vec<f64> {
        let start = match self.objective {
            Objective::SoftProb => self.base_score,
            Objective::Logistic => logit(self.base_score),
        };
        let width = match self.objective {
            Objective::SoftProb => self.num_class,
            Objective::Logistic => 1,
        };
        let mut margins = vec![start; width];
        for tree in &self.trees {
            margins[tree.class] += tree.leaf_value(row);
        }
        margins
    }
}

impl Classifier for TreeEnsemble {
    fn input_width(&self) -> usize {
        self.num_feature
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if self.num_feature > 0 && row.len() != self.num_feature {
            return Err(ModelError::FeatureWidth {
                expected: self.num_feature,
                got: row.len(),
            });
        }
        let mut margins = self.margins(row);
        match self.objective {
            Objective::SoftProb => {
                softmax_in_place(&mut margins);
                Ok(margins)
            }
            Objective::Logistic => {
                let p = sigmoid(margins[0]);
                Ok(vec![1.0 - p, p])
            }
        }
    }
}

fn build_tree(idx: usize, t: XgbTree, class: usize, num_class: usize) -> Result<Tree, ModelError> {
    let n = t.left_children.len();
    if n == 0
        || t.right_children.len() != n
        || t.split_indices.len() != n
        || t.split_conditions.len() != n
        || t.default_left.len() != n
    {
        return Err(ModelError::Invalid(format!("tree {idx} has ragged node arrays")));
    }
    if class >= num_class {
        return Err(ModelError::Invalid(format!(
            "tree {idx} belongs to class {class} of {num_class}"
        )));
    }
    for node in 0..n {
        let (l, r) = (t.left_children[node], t.right_children[node]);
        let in_subtree = |c: i32| c >= 0 && (c as usize) > node && (c as usize) < n;
        if l >= 0 && !(in_subtree(l) && in_subtree(r)) {
            return Err(ModelError::Invalid(format!(
                "tree {idx} node {node} has bad children"
            )));
        }
    }
    let default_left = t
        .default_left
        .iter()
        .map(|v| match v {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
            _ => false,
        })
        .collect();

    Ok(Tree {
        left: t.left_children,
        right: t.right_children,
        split_index: t.split_indices,
        split_condition: t.split_conditions,
        default_left,
        class,
    })
}

// XGBoost writes scalars as strings, sometimes bracketed ("[5E-1]").
fn parse_param(raw: Option<&str>) -> Option<f64> {
    let s = raw?.trim().trim_start_matches('[').trim_end_matches(']');
    s.parse::<f64>().ok()
}

fn logit(p: f64) -> f64 {
    let p = p.clamp(1e-7, 1.0 - 1e-7);
    (p / (1.0 - p)).ln()
}
