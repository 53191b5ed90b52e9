//! ランダム質問戦略
//!
//! 設定されたテンプレートから1件選び、プレースホルダを変数定義から
//! 解決した値で置換する。外部I/Oを行わない唯一の戦略。

use super::{PromptStrategy, StrategyKind};
use crate::error::KeeperResult;
use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;

/// 変数の値域指定
///
/// - 2要素の整数リスト → 両端を含む一様な整数乱数
/// - それ以外のリスト → 一様な要素選択
/// - スカラー → そのまま使用
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VariableSpec {
    /// リスト（範囲または選択肢）
    List(Vec<serde_yaml::Value>),
    /// 単一値
    Scalar(serde_yaml::Value),
}

/// ランダム質問戦略の設定
#[derive(Debug, Clone, Deserialize)]
pub struct RandomQuestionConfig {
    /// 質問テンプレート一覧
    #[serde(default)]
    pub question_templates: Vec<String>,
    /// プレースホルダ名と値域のマップ（省略時は空）
    #[serde(default)]
    pub variables: BTreeMap<String, VariableSpec>,
}

/// ランダム質問戦略
pub struct RandomQuestionStrategy {
    config: RandomQuestionConfig,
}

impl RandomQuestionStrategy {
    /// 戦略固有設定から構築する
    pub fn from_config(raw: &serde_yaml::Value) -> KeeperResult<Self> {
        let config: RandomQuestionConfig = super::typed_config(raw, StrategyKind::RandomQuestion)?;
        Ok(Self { config })
    }

    fn generate_sync(&self) -> Option<String> {
        if self.config.question_templates.is_empty() {
            return None;
        }
        let template = pick(&self.config.question_templates);

        let mut prompt = template.clone();
        for (name, spec) in &self.config.variables {
            let placeholder = format!("{{{name}}}");
            if !template.contains(&placeholder) {
                continue;
            }
            let value = resolve_variable(spec)?;
            prompt = prompt.replace(&placeholder, &value);
        }
        Some(prompt)
    }
}

#[async_trait]
impl PromptStrategy for RandomQuestionStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RandomQuestion
    }

    async fn generate(&self) -> Option<String> {
        self.generate_sync()
    }
}

/// 変数定義から値を1つ解決する
fn resolve_variable(spec: &VariableSpec) -> Option<String> {
    match spec {
        VariableSpec::List(items) => {
            if items.len() == 2 {
                if let (Some(low), Some(high)) = (items[0].as_i64(), items[1].as_i64()) {
                    let (low, high) = if low <= high { (low, high) } else { (high, low) };
                    let mut rng = rand::rng();
                    return Some(rng.random_range(low..=high).to_string());
                }
            }
            if items.is_empty() {
                return None;
            }
            scalar_to_string(pick(items))
        }
        VariableSpec::Scalar(value) => scalar_to_string(value),
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn pick<T>(items: &[T]) -> &T {
    let mut rng = rand::rng();
    &items[rng.random_range(0..items.len())]
}
