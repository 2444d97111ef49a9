/**
 * Binding Provider CLI
 *
 * Command definition and subcommand handlers behind the `ko-bind` binary:
 * rewrite annotations into canonical object-literal form, check that they
 * compile, or resolve them against JSON view-model data.
 */
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use binding_provider::{
    rewrite_bindings, BindingContext, BindingProvider, CommentNode, ElementNode, NodeRef,
    ProviderConfig, Value,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::debug;

pub fn cli() -> Command {
    let text = Arg::new("text")
        .value_name("TEXT")
        .required(true)
        .help("Binding annotation, e.g. \"text: name, visible: shown\"");

    Command::new("ko-bind")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Declarative binding provider (Rust implementation)")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Path to a JSON provider configuration"),
        )
        .arg(
            Arg::new("attribute")
                .short('a')
                .long("attribute")
                .value_name("NAME")
                .global(true)
                .help("Binding attribute name (overrides the configuration)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Log compilation and resolution (-vv for cache traffic)"),
        )
        .subcommand(
            Command::new("rewrite")
                .about("Print the canonical object-literal form of an annotation")
                .arg(text.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Compile an annotation and list its bindings")
                .arg(text.clone()),
        )
        .subcommand(
            Command::new("eval")
                .about("Resolve an annotation against JSON data and print every binding value")
                .arg(text)
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_name("JSON")
                        .help("View-model bound to the node ($data)"),
                )
                .arg(
                    Arg::new("parent")
                        .short('p')
                        .long("parent")
                        .value_name("JSON")
                        .action(ArgAction::Append)
                        .help("Ancestor view-model, outermost first; may be repeated"),
                )
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .value_name("JSON")
                        .help("Root view-model ($root)"),
                )
                .arg(
                    Arg::new("comment")
                        .long("comment")
                        .action(ArgAction::SetTrue)
                        .help("Treat TEXT as the contents of a virtual element comment"),
                ),
        )
}

/// Log filter for the number of `-v` flags
pub fn log_level(matches: &ArgMatches) -> log::LevelFilter {
    match matches.get_count("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Run the selected subcommand and return what it prints
pub fn run(matches: &ArgMatches) -> Result<String> {
    let provider = build_provider(matches)?;

    match matches.subcommand() {
        Some(("rewrite", sub)) => Ok(rewrite_bindings(text_arg(sub))?),
        Some(("check", sub)) => {
            let evaluator = provider.compiler().compile(text_arg(sub))?;
            let lines: Vec<String> = evaluator
                .bindings()
                .iter()
                .map(|binding| format!("{}\t{:?}", binding.name, binding.form))
                .collect();
            Ok(lines.join("\n"))
        }
        Some(("eval", sub)) => {
            let text = text_arg(sub);
            let node: NodeRef = if sub.get_flag("comment") {
                CommentNode::new(format!(" {} {} ", provider.config().virtual_element_prefix, text))
                    .into_ref()
            } else {
                ElementNode::new("div")
                    .with_attribute(provider.config().binding_attribute.as_str(), text)
                    .into_ref()
            };
            let context = build_context(sub)?;

            let Some(accessors) = provider.get_binding_accessors(&node, &context)? else {
                bail!("node has no bindings");
            };
            let values = accessors.read_all()?;
            Ok(serde_json::to_string_pretty(&values)?)
        }
        Some((name, _)) => bail!("unknown subcommand `{}`", name),
        None => bail!("a subcommand is required"),
    }
}

fn text_arg(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("text")
        .map(String::as_str)
        .unwrap_or_default()
}

fn build_provider(matches: &ArgMatches) -> Result<BindingProvider> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration {}", path))?;
            ProviderConfig::from_json_str(&json)
                .with_context(|| format!("invalid configuration {}", path))?
        }
        None => ProviderConfig::default(),
    };
    if let Some(attribute) = matches.get_one::<String>("attribute") {
        config.binding_attribute = attribute.clone();
    }
    debug!("provider configuration: {:?}", config);

    Ok(BindingProvider::with_config(config)?)
}

/// Root, then each parent, then the node's own data, nearest last
fn build_context(matches: &ArgMatches) -> Result<Arc<BindingContext>> {
    let mut levels = Vec::new();
    if let Some(root) = matches.get_one::<String>("root") {
        levels.push(parse_json("--root", root)?);
    }
    if let Some(parents) = matches.get_many::<String>("parent") {
        for parent in parents {
            levels.push(parse_json("--parent", parent)?);
        }
    }
    if let Some(data) = matches.get_one::<String>("data") {
        levels.push(parse_json("--data", data)?);
    }

    let mut levels = levels.into_iter();
    let mut context = BindingContext::root(levels.next().unwrap_or_default());
    for data in levels {
        context = context.create_child_context(data, None);
    }
    Ok(context)
}

fn parse_json(flag: &str, json: &str) -> Result<Value> {
    let value: serde_json::Value =
        serde_json::from_str(json).with_context(|| format!("{} is not valid JSON", flag))?;
    Ok(Value::from(value))
}
