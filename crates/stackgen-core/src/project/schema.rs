//! Prisma schema provider substitution

use crate::options::Database;
use std::fmt;

/// Location of the Prisma schema inside a package
pub const PRISMA_SCHEMA_PATH: &str = "prisma/schema.prisma";

/// Datasource provider literal written into the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaProvider {
    PostgreSql,
    MySql,
}

impl SchemaProvider {
    /// Provider for a concrete database; `None` has no provider
    pub fn for_database(database: Database) -> Option<Self> {
        match database {
            Database::PostgreSql => Some(SchemaProvider::PostgreSql),
            Database::MySql => Some(SchemaProvider::MySql),
            Database::None => None,
        }
    }

    pub fn literal(&self) -> &'static str {
        match self {
            SchemaProvider::PostgreSql => "postgresql",
            SchemaProvider::MySql => "mysql",
        }
    }
}

impl fmt::Display for SchemaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

/// Instruction to set the datasource provider of a schema fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaRewrite {
    pub provider: SchemaProvider,
}

/// Replace the `provider = "..."` line of every `datasource` block.
///
/// `generator` blocks also have a `provider` key and are left alone. Returns
/// `None` when the schema declares no datasource provider at all.
pub fn rewrite_provider(schema: &str, provider: SchemaProvider) -> Option<String> {
    let mut out = String::with_capacity(schema.len());
    let mut in_datasource = false;
    let mut replaced = false;

    for line in schema.split_inclusive('\n') {
        let trimmed = line.trim();

        if !in_datasource {
            if trimmed.starts_with("datasource") && trimmed.ends_with('{') {
                in_datasource = true;
            }
            out.push_str(line);
            continue;
        }

        if trimmed.starts_with('}') {
            in_datasource = false;
            out.push_str(line);
            continue;
        }

        let is_provider = trimmed
            .strip_prefix("provider")
            .is_some_and(|rest| rest.trim_start().starts_with('='));
        if !is_provider {
            out.push_str(line);
            continue;
        }

        let indent = &line[..line.len() - line.trim_start().len()];
        let line_ending = if line.ends_with("\r\n") {
            "\r\n"
        } else if line.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        out.push_str(indent);
        out.push_str(&format!("provider = \"{}\"", provider.literal()));
        out.push_str(line_ending);
        replaced = true;
    }

    replaced.then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"generator client {
  provider = "prisma-client-js"
}

datasource db {
  provider = "postgresql"
  url      = env("DATABASE_URL")
}

model User {
  id    String @id @default(cuid())
  email String @unique
}
"#;

    fn datasource_providers(schema: &str) -> Vec<String> {
        let start = schema.find("datasource").unwrap();
        schema[start..]
            .lines()
            .take_while(|l| !l.trim().starts_with('}'))
            .filter(|l| l.trim().starts_with("provider"))
            .map(|l| l.trim().to_string())
            .collect()
    }

    #[test]
    fn test_rewrite_to_mysql() {
        let out = rewrite_provider(SCHEMA, SchemaProvider::MySql).unwrap();
        assert_eq!(datasource_providers(&out), vec!["provider = \"mysql\""]);
        assert!(!out.contains("\"postgresql\""));
        assert!(out.contains("provider = \"prisma-client-js\""));
        assert!(out.contains("url      = env(\"DATABASE_URL\")"));
    }

    #[test]
    fn test_rewrite_to_postgresql_is_identity() {
        let out = rewrite_provider(SCHEMA, SchemaProvider::PostgreSql).unwrap();
        assert_eq!(out, SCHEMA);
    }

    #[test]
    fn test_output_provider_is_always_a_known_literal() {
        for database in [Database::PostgreSql, Database::MySql] {
            let provider = SchemaProvider::for_database(database).unwrap();
            let out = rewrite_provider(SCHEMA, provider).unwrap();
            let providers = datasource_providers(&out);
            assert_eq!(providers.len(), 1);
            assert!(
                providers[0] == "provider = \"postgresql\""
                    || providers[0] == "provider = \"mysql\""
            );
            assert!(providers[0].contains(provider.literal()));
        }
    }

    #[test]
    fn test_schema_without_datasource_is_rejected() {
        let schema = "generator client {\n  provider = \"prisma-client-js\"\n}\n";
        assert_eq!(rewrite_provider(schema, SchemaProvider::MySql), None);
    }

    #[test]
    fn test_preserves_crlf_and_indentation() {
        let schema = "datasource db {\r\n\tprovider = \"postgresql\"\r\n}\r\n";
        let out = rewrite_provider(schema, SchemaProvider::MySql).unwrap();
        assert_eq!(out, "datasource db {\r\n\tprovider = \"mysql\"\r\n}\r\n");
    }
}
