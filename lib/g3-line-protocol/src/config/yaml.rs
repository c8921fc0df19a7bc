/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, yaml};

use super::WriterConfig;
use crate::{Precision, PrecisionResolutionStrategy};

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

impl Precision {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        match value {
            Yaml::String(s) => Ok(Precision::from_str(s)?),
            Yaml::Integer(i) => Ok(Precision::try_from(*i)?),
            _ => Err(anyhow!(
                "yaml value type for timestamp precision should be 'string' or 'integer'"
            )),
        }
    }
}

impl PrecisionResolutionStrategy {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::String(s) = value {
            Ok(PrecisionResolutionStrategy::from_str(s)?)
        } else {
            Err(anyhow!(
                "yaml value type for precision resolution strategy should be 'string'"
            ))
        }
    }
}

impl WriterConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::Hash(map) => {
                let mut config = WriterConfig::default();
                foreach_kv(map, |k, v| config.set_by_yaml_kv(k, v))?;
                Ok(config)
            }
            Yaml::String(_) | Yaml::Integer(_) => {
                let precision = Precision::parse_yaml(v)?;
                Ok(WriterConfig::new(precision, Default::default()))
            }
            _ => Err(anyhow!(
                "yaml value type for 'line protocol writer config' should be 'map'"
            )),
        }
    }

    fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "precision" => {
                let precision = Precision::parse_yaml(v)
                    .context(format!("invalid timestamp precision value for key {k}"))?;
                self.set_precision(precision);
                Ok(())
            }
            "resolution_strategy" | "strategy" => {
                let strategy = PrecisionResolutionStrategy::parse_yaml(v).context(format!(
                    "invalid precision resolution strategy value for key {k}"
                ))?;
                self.set_resolution_strategy(strategy);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}
