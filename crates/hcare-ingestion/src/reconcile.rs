//! Location-name reconciliation between the WHO and IHME exports.

use std::collections::BTreeMap;

use tracing::debug;

use hcare_common::schema::LocationAliases;
use hcare_common::Table;

fn rename(table: &mut Table, aliases: &BTreeMap<String, String>) -> usize {
    let mut renamed = 0;
    for row in table.rows_mut() {
        if let Some(to) = aliases.get(&row.location) {
            row.location = to.clone();
            renamed += 1;
        }
    }
    renamed
}

/// Rename WHO locations through `aliases.who` and IHME locations through
/// `aliases.ihme`, so both sides spell a country the same way before the join.
/// Returns `(workforce, burden)`.
pub fn reconcile_locations(
    mut workforce: Table,
    mut burden: Table,
    aliases: &LocationAliases,
) -> (Table, Table) {
    let who = rename(&mut workforce, &aliases.who);
    let ihme = rename(&mut burden, &aliases.ihme);
    if who + ihme > 0 {
        debug!(who, ihme, "Reconciled location names");
    }
    (workforce, burden)
}
