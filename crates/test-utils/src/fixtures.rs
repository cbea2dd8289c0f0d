//! Talend job documents shared by the test suites.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A four-component job: database and delimited-file inputs joined by a
/// `tMap` into a database output. `out1` is declared twice with different
/// columns; the tMap's version comes first.
pub const ORDERS_JOB_ITEM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<talendfile:ProcessType xmlns:xmi="http://www.omg.org/XMI" xmlns:talendfile="platform:/resource/org.talend.model/model/TalendFile.xsd" xmlns:TalendProperties="http://www.talend.org/properties" defaultConnectionName="row" jobType="Standard">
  <TalendProperties:Property id="_w1RkAPt4EeqGk" label="orders_daily_load" version="0.1"/>
  <context confirmationNeeded="false" name="Default">
    <contextParameter name="db_host" type="id_String" value="localhost"/>
  </context>
  <parameters>
    <elementParameter field="TEXT" name="JOB_RUN_VM_ARGUMENTS" value=" -Xms256M -Xmx1024M"/>
  </parameters>
  <node componentName="tDBInput" componentVersion="0.102" uniqueName="tDBInput_1" posX="128" posY="160">
    <elementParameter field="TEXT" name="UNIQUE_NAME" value="tDBInput_1"/>
    <elementParameter field="TEXT" name="LABEL" value="&quot;Orders source&quot;"/>
    <elementParameter field="TEXT" name="HOST" value="context.db_host"/>
    <elementParameter field="TEXT" name="TABLE" value="&quot;orders&quot;"/>
    <elementParameter field="MEMO_SQL" name="QUERY" value="&quot;SELECT order_id, customer_id, amount FROM orders&quot;"/>
    <elementParameter field="CHECK" name="ACTIVATE" value="true"/>
    <metadata connector="FLOW" name="orders_schema">
      <column key="true" length="10" name="order_id" nullable="false" precision="0" type="id_Integer"/>
      <column key="false" length="10" name="customer_id" nullable="true" type="id_Integer" comment="FK to customers"/>
      <column name="amount" type="id_BigDecimal" length="12" precision="2" defaultValue="&quot;0.00&quot;"/>
    </metadata>
  </node>
  <node componentName="tFileInputDelimited" componentVersion="0.102" uniqueName="tFileInputDelimited_1" posX="128" posY="320">
    <elementParameter field="FILE" name="FILENAME" value="&quot;/data/in/customers.csv&quot;"/>
    <elementParameter field="TEXT" name="FIELDSEPARATOR" value="&quot;;&quot;"/>
    <elementParameter field="TEXT" name="HINT" value="Customer master data"/>
    <metadata connector="FLOW" name="customers_schema">
      <column key="true" name="customer_id" nullable="false" type="id_Integer"/>
      <column name="customer_name" type="id_String" length="100"/>
    </metadata>
  </node>
  <node componentName="tMap" componentVersion="2.1" uniqueName="tMap_1" posX="384" posY="160">
    <elementParameter field="TEXT" name="LABEL" value="Join orders"/>
    <elementParameter field="TABLE" name="OUTPUT_TABLES" value="out1: row1.amount * 1.2"/>
    <metadata connector="FLOW" name="out1">
      <column key="true" name="order_id" nullable="false" type="id_Integer"/>
      <column name="customer_name" type="id_String"/>
      <column name="amount_gross" type="id_BigDecimal" precision="2"/>
    </metadata>
  </node>
  <node componentName="tDBOutput" componentVersion="0.102" uniqueName="tDBOutput_1" posX="640" posY="160">
    <elementParameter field="TEXT" name="TABLE" value="&quot;orders_enriched&quot;"/>
    <elementParameter field="CLOSED_LIST" name="DATA_ACTION" value="INSERT"/>
    <metadata connector="FLOW" name="out1">
      <column name="order_id" type="id_Integer"/>
    </metadata>
  </node>
  <connection connectorName="FLOW" label="orders" lineStyle="0" metaname="tDBInput_1" source="tDBInput_1" target="tMap_1">
    <elementParameter field="CHECK" name="MONITOR_CONNECTION" value="false"/>
  </connection>
  <connection connectorName="FLOW" label="customers" lineStyle="8" metaname="tFileInputDelimited_1" source="tFileInputDelimited_1" target="tMap_1"/>
  <connection connectorName="FLOW" label="out1" lineStyle="0" metaname="out1" source="tMap_1" target="tDBOutput_1"/>
  <note opaque="true" text="Daily load of orders enriched with customer names"/>
  <note opaque="false"/>
</talendfile:ProcessType>
"#;

/// A job without a `Property` element, named only by its `processType`.
pub const PROCESS_TYPE_ONLY_JOB: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<job>
  <processType name="legacy_export">
    <node componentName="tFileOutputDelimited" uniqueName="tFileOutputDelimited_1">
      <elementParameter field="FILE" name="FILENAME" value="&quot;/data/out/export.csv&quot;"/>
    </node>
  </processType>
</job>
"#;

/// Not well-formed: the `node` element is never closed.
pub const MALFORMED_JOB: &str =
    r#"<talendfile:ProcessType xmlns:talendfile="x"><node componentName="tDBInput">"#;

/// A well-formed document with none of the recognized elements.
pub const EMPTY_JOB: &str = "<root/>";

/// A completion answer with two fenced SQL models.
pub const TWO_MODEL_COMPLETION: &str = "Here are your dbt models.\n\n```sql\nselect order_id, amount\nfrom {{ source('erp', 'orders') }}\n```\n\nAnd the enriched model:\n\n```sql\nselect o.order_id, c.customer_name\nfrom {{ ref('stg_orders') }} o\njoin {{ ref('stg_customers') }} c using (customer_id)\n```\n";

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_fixture(dir: &Path, name: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}
