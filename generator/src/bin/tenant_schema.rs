use schemars::schema_for;

use tenantgen_common::tenant::TenantCatalog;

fn main() -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(&schema_for!(TenantCatalog))?);
    Ok(())
}
