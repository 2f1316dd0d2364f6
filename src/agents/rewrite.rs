use crate::agents::declaration::{BlockRef, Declaration, HELM_RELEASE, object_key};
use crate::error::{Result, TflvError};
use hcl_edit::Ident;
use hcl_edit::expr::{Expression, Object, ObjectKey, ObjectValue, ObjectValueAssignment, ObjectValueTerminator};
use hcl_edit::repr::{Decor, Decorate, Decorated};
use hcl_edit::structure::{Attribute, Block, BlockLabel, Body};
use tracing::debug;

const VERSION_KEY: &str = "version";

/// Sets the `version` of the declaration's block or provider object, touching
/// nothing else except the `=` alignment of an edited provider object.
///
/// The target is located before anything is changed, so an error leaves
/// `body` as it was.
pub fn apply_version(body: &mut Body, declaration: &Declaration, version: &str) -> Result<()> {
    match &declaration.block_ref {
        BlockRef::RequiredProvider { name } => {
            let realigned = with_provider(body, name, |object| {
                set_object_version(object, version);
                align_object(object)
            })
            .ok_or_else(|| not_found(declaration))?;
            if realigned > 0 {
                debug!("Realigned {} entries of provider {}", realigned, name);
            }
        }
        BlockRef::HelmRelease { name } => {
            let block = find_release(body, name).ok_or_else(|| not_found(declaration))?;
            set_block_version(block, version);
        }
    }
    Ok(())
}

fn not_found(declaration: &Declaration) -> TflvError {
    TflvError::Rewrite(format!(
        "could not find block for {} to update",
        declaration.display_name
    ))
}

/// Runs `edit` on the first `required_providers` record named `name`.
fn with_provider<R>(body: &mut Body, name: &str, edit: impl FnOnce(&mut Object) -> R) -> Option<R> {
    for terraform in body.get_blocks_mut("terraform") {
        for required in terraform.body.get_blocks_mut("required_providers") {
            if let Some(mut attr) = required.body.get_attribute_mut(name) {
                return attr.value_mut().as_object_mut().map(edit);
            }
        }
    }
    None
}

fn find_release<'b>(body: &'b mut Body, name: &str) -> Option<&'b mut Block> {
    body.get_blocks_mut("resource").find(|block| {
        let labels: Vec<&str> = block.labels.iter().map(BlockLabel::as_str).collect();
        labels == [HELM_RELEASE, name]
    })
}

fn set_block_version(block: &mut Block, version: &str) {
    if let Some(mut attr) = block.body.get_attribute_mut(VERSION_KEY) {
        replace_value(attr.value_mut(), version);
        return;
    }

    let indent = block
        .body
        .iter()
        .last()
        .map(|structure| indentation(structure.decor()))
        .unwrap_or_else(|| "  ".to_string());
    let mut attr = Attribute::new(version_key(), version_expression(version, Decor::new(" ", "")));
    attr.decor_mut().set_prefix(indent);
    block.body.push(attr);
}

fn set_object_version(object: &mut Object, version: &str) {
    let existing = object
        .iter()
        .find(|(key, _)| object_key(key) == Some(VERSION_KEY))
        .map(|(key, _)| key.clone());
    if let Some(key) = existing {
        if let Some(value) = object.get_mut(&key) {
            replace_value(value.expr_mut(), version);
        }
        return;
    }

    let mut key = version_key();
    let last = object
        .iter()
        .last()
        .map(|(key, value)| (indentation(key.decor()), value.terminator()));

    let value = match last {
        // One entry per line: the new entry goes on its own line below the last.
        Some((indent, ObjectValueTerminator::Newline)) => {
            key.decor_mut().set_prefix(indent);
            let mut value = ObjectValue::new(version_expression(version, Decor::new(" ", "")));
            value.set_terminator(ObjectValueTerminator::Newline);
            value
        }
        // Inline record: `{ source = "x" }` becomes `{ source = "x", version = "y" }`.
        Some((_, terminator)) => {
            let mut suffix = None;
            if let Some((_, previous)) = object.iter_mut().last() {
                suffix = previous.expr().decor().suffix().cloned();
                previous.expr_mut().decor_mut().set_suffix("");
                previous.set_terminator(ObjectValueTerminator::Comma);
            }
            key.decor_mut().set_prefix(" ");
            let mut decor = Decor::new(" ", "");
            if let Some(suffix) = suffix {
                decor.set_suffix(suffix);
            }
            let mut value = ObjectValue::new(version_expression(version, decor));
            value.set_terminator(terminator);
            value
        }
        None => {
            key.decor_mut().set_prefix(" ");
            let mut value = ObjectValue::new(version_expression(version, Decor::new(" ", " ")));
            value.set_terminator(ObjectValueTerminator::None);
            value
        }
    };

    object.insert(ObjectKey::Ident(key), value);
}

fn version_key() -> Decorated<Ident> {
    let mut key = Decorated::new(Ident::new(VERSION_KEY));
    key.decor_mut().set_suffix(" ");
    key
}

fn version_expression(version: &str, decor: Decor) -> Expression {
    let mut expr = Expression::String(Decorated::new(version.to_string()));
    *expr.decor_mut() = decor;
    expr
}

/// Swaps the value but keeps the whitespace and comments around it.
fn replace_value(expr: &mut Expression, version: &str) {
    let decor = expr.decor().clone();
    *expr = version_expression(version, decor);
}

/// Leading whitespace of the line a node starts on.
fn indentation(decor: &Decor) -> String {
    let prefix = decor.prefix().map(|raw| raw.to_string()).unwrap_or_default();
    let own_line = prefix.rsplit('\n').next().unwrap_or_default();
    own_line.chars().take_while(|c| *c == ' ' || *c == '\t').collect()
}

struct AlignedEntry {
    key_end: usize,
    starts_group: bool,
    single_line: bool,
}

/// Aligns the `=` of consecutive single-line entries the way `terraform fmt`
/// does and returns how many separators moved. Records with entries sharing a
/// line, `:` separators, quoted keys or comments between a key and its
/// separator are left alone.
fn align_object(object: &mut Object) -> usize {
    let count = object.len();
    let mut entries = Vec::with_capacity(count);

    for (index, (key, value)) in object.iter().enumerate() {
        let ObjectKey::Ident(ident) = key else {
            return 0;
        };
        let gap = key.decor().suffix().map(|raw| raw.to_string()).unwrap_or_default();
        if !gap.chars().all(|c| c == ' ' || c == '\t')
            || !matches!(value.assignment(), ObjectValueAssignment::Equals)
        {
            return 0;
        }
        if index + 1 < count && !matches!(value.terminator(), ObjectValueTerminator::Newline) {
            return 0;
        }

        let prefix = key.decor().prefix().map(|raw| raw.to_string()).unwrap_or_default();
        entries.push(AlignedEntry {
            key_end: indentation(key.decor()).chars().count() + ident.as_str().chars().count(),
            starts_group: prefix.contains('\n'),
            single_line: !value.expr().to_string().contains('\n'),
        });
    }

    let mut paddings = vec![String::new(); count];
    let mut start = 0;
    while start < count {
        let mut end = start + 1;
        while end < count && entries[end - 1].single_line && !entries[end].starts_group {
            end += 1;
        }

        let column = entries[start..end]
            .iter()
            .map(|entry| entry.key_end)
            .max()
            .unwrap_or_default();
        for (padding, entry) in paddings[start..end].iter_mut().zip(&entries[start..end]) {
            *padding = " ".repeat(column - entry.key_end + 1);
        }

        start = end;
    }

    let mut moved = 0;
    for ((mut key, _), padding) in object.iter_mut().zip(paddings) {
        let gap = key.decor().suffix().map(|raw| raw.to_string()).unwrap_or_default();
        if gap != padding {
            key.decor_mut().set_suffix(padding);
            moved += 1;
        }
    }
    moved
}
