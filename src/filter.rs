use crate::xref::EntityType;
use anyhow::{anyhow, bail, Result};

/// Resolves which entity types to report based on include/exclude filters
pub fn resolve_types(
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<Vec<EntityType>> {
    match (include, exclude) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --include and --exclude at the same time");
        }
        (Some(include_list), None) => {
            let wanted = parse_types(&include_list)?;
            Ok(EntityType::ALL
                .into_iter()
                .filter(|t| wanted.contains(t))
                .collect())
        }
        (None, Some(exclude_list)) => {
            let unwanted = parse_types(&exclude_list)?;
            Ok(EntityType::ALL
                .into_iter()
                .filter(|t| !unwanted.contains(t))
                .collect())
        }
        (None, None) => Ok(EntityType::ALL.to_vec()),
    }
}

fn parse_types(names: &[String]) -> Result<Vec<EntityType>> {
    names
        .iter()
        .map(|name| name.trim().parse::<EntityType>().map_err(|e| anyhow!(e)))
        .collect()
}
