//! Provisioning SQL for the hosted stall table.
//!
//! Shown to operators when the backend reports the table as missing.

/// Provisioning script for the default `stalls` table.
pub const PROVISIONING_SQL: &str = r#"create table if not exists public.stalls (
  id text primary key,
  name text,
  zone text,
  price numeric,
  size text,
  status text,
  features text[],
  tenant text
);

alter table public.stalls enable row level security;

drop policy if exists "Allow public access" on public.stalls;

create policy "Allow public access"
on public.stalls
for all
using (true)
with check (true);"#;

/// Provisioning script for a table with a custom name.
pub fn provisioning_sql(table: &str) -> String {
    PROVISIONING_SQL.replace("public.stalls", &format!("public.{table}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_creates_every_record_column() {
        for column in ["id text primary key", "zone text", "price numeric", "features text[]", "tenant text"] {
            assert!(PROVISIONING_SQL.contains(column), "missing column definition: {column}");
        }
    }

    #[test]
    fn custom_table_names_are_substituted_everywhere() {
        let sql = provisioning_sql("market_stalls");
        assert!(!sql.contains("public.stalls"));
        assert_eq!(sql.matches("public.market_stalls").count(), 4);
    }
}
