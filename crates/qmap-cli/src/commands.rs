use std::fs;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use qmap_cli::json::value_from_json;
use qmap_cli::samples;
use qmap_engine::{Mapper, Transformation, TypePair};
use qmap_model::{ConstructorDesc, Reflect, TypeDesc, Value};
use tracing::{info, info_span};

use crate::cli::{InspectArgs, MapArgs, SamplePairArg};

impl SamplePairArg {
    fn pair(self) -> TypePair {
        match self {
            Self::People => TypePair::new("Person", "PersonDto"),
            Self::Books => TypePair::new("Book", "ReadBookResponse"),
        }
    }

    fn samples(self) -> Vec<Value> {
        match self {
            Self::People => samples::people().iter().map(Reflect::to_value).collect(),
            Self::Books => samples::books().iter().map(Reflect::to_value).collect(),
        }
    }
}

pub fn run_map(args: &MapArgs) -> Result<()> {
    let mapper = samples::mapper()?;
    let pair = args.pair.pair();
    let span = info_span!("map", pair = %pair);
    let _guard = span.enter();

    let sources = match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            let json: serde_json::Value =
                serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
            let serde_json::Value::Array(items) = json else {
                bail!("{} must hold a JSON array of {} objects", path.display(), pair.source);
            };
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    value_from_json(item, &pair.source_ty(), mapper.catalog())
                        .with_context(|| format!("input element {idx}"))
                })
                .collect::<Result<Vec<_>>>()?
        }
        None => args.pair.samples(),
    };

    let start = Instant::now();
    let mapped = mapper.map_values(&pair, &sources)?;
    info!(
        count = mapped.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "mapped"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mapped)?);
    } else {
        println!("{}", value_table(&mapper, &pair, &mapped));
    }
    Ok(())
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let mapper = samples::mapper()?;
    let pair = args.pair.pair();
    if args.projection {
        println!("{}", mapper.project_pair(&pair)?);
    } else if args.table {
        println!("{}", binding_table(&*mapper.transformation(&pair)?));
    } else {
        println!("{}", mapper.inspect_pair(&pair)?);
    }
    Ok(())
}

/// Constructor arguments first, then member bindings in assignment order.
fn binding_table(transformation: &Transformation) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Target", "Source"]);
    apply_table_style(&mut table);
    if let Some(constructor) = transformation.constructor() {
        for (idx, arg) in transformation.constructor_args().iter().enumerate() {
            table.add_row(vec![format!("{constructor}(#{idx})"), arg.to_string()]);
        }
    }
    for binding in transformation.bindings() {
        table.add_row(vec![binding.member.clone(), binding.value.to_string()]);
    }
    table
}

pub fn run_types() -> Result<()> {
    let mapper = samples::mapper()?;
    let catalog = mapper.catalog();
    let mut names: Vec<_> = catalog.type_names().collect();
    names.sort();

    let mut table = Table::new();
    table.set_header(vec!["Type", "Kind", "Members", "Constructors"]);
    apply_table_style(&mut table);
    for name in names {
        let row = match catalog.get(name) {
            Some(TypeDesc::Object(desc)) => vec![
                name.to_string(),
                "object".to_string(),
                desc.members
                    .iter()
                    .map(|m| format!("{}: {}", m.name, m.ty))
                    .collect::<Vec<_>>()
                    .join("\n"),
                desc.constructors
                    .iter()
                    .map(ConstructorDesc::signature)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ],
            Some(TypeDesc::Enum(desc)) => vec![
                name.to_string(),
                "enum".to_string(),
                desc.variants
                    .iter()
                    .map(|(variant, discriminant)| format!("{variant} = {discriminant}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
                String::new(),
            ],
            None => continue,
        };
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

/// One row per mapped object, one column per destination member.
fn value_table(mapper: &Mapper, pair: &TypePair, values: &[Value]) -> Table {
    let mut table = Table::new();
    let members: Vec<String> = mapper
        .catalog()
        .object(&pair.destination)
        .map(|desc| desc.members.iter().map(|m| m.name.clone()).collect())
        .unwrap_or_default();
    table.set_header(members.clone());
    apply_table_style(&mut table);
    for value in values {
        let Some(object) = value.as_object() else {
            continue;
        };
        table.add_row(
            members
                .iter()
                .map(|member| object.get(member).map(render_cell).unwrap_or_default())
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Seq(items) => items.iter().map(render_cell).collect::<Vec<_>>().join(", "),
        Value::Lazy(_) => "<lazy>".to_string(),
        Value::Object(object) => {
            let fields: Vec<String> = object
                .fields()
                .map(|(name, value)| format!("{name}: {}", render_cell(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        scalar => scalar.to_text().unwrap_or_default(),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

#[cfg(test)]
mod tests {
    use comfy_table::Cell;
    use qmap_model::ObjectValue;

    use super::*;

    #[test]
    fn cells_render_nested_values() {
        let animal: Value = ObjectValue::new("AnimalDto")
            .with("Name", "Pamuk")
            .with("Age", 0)
            .into();
        assert_eq!(render_cell(&Value::Seq(vec![animal])), "{Name: Pamuk, Age: 0}");
        assert_eq!(render_cell(&Value::Null), "");
    }

    #[test]
    fn binding_table_lists_constructor_arguments_first() {
        let mapper = samples::mapper().unwrap();
        let transformation = mapper.transformation(&SamplePairArg::People.pair()).unwrap();
        let table = binding_table(&transformation);
        let targets: Vec<String> = table
            .row_iter()
            .filter_map(|row| row.cell_iter().next().map(Cell::content))
            .collect();
        assert_eq!(targets, vec!["new(#0)", "new(#1)", "Age", "Fullname", "Animals"]);
    }

    #[test]
    fn sample_pairs_are_configured() {
        let mapper = samples::mapper().unwrap();
        for arg in [SamplePairArg::People, SamplePairArg::Books] {
            let mapped = mapper.map_values(&arg.pair(), &arg.samples()).unwrap();
            assert_eq!(mapped.len(), 2);
        }
    }
}
