use outbound_tracker::{InvestmentTable, Result, TableLoader};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const HEADER: &str =
    "Year,Month,Investor,Millions,Partner/Target,Country,Region,Sector,Subsector,BRI";

pub struct TestFixture {
    pub temp_dir: TempDir,
    pub csv_path: PathBuf,
}

impl TestFixture {
    /// Write `rows` (without header) to a CSV in a fresh temp dir
    pub fn with_rows(rows: &[&str]) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let csv_path = temp_dir.path().join("tracker.csv");
        let mut content = String::from(HEADER);
        for row in rows {
            content.push('\n');
            content.push_str(row);
        }
        content.push('\n');
        fs::write(&csv_path, content)?;

        Ok(Self { temp_dir, csv_path })
    }

    pub fn load(&self) -> Result<InvestmentTable> {
        TableLoader::new().load(&self.csv_path)
    }
}

pub fn sample_rows() -> Vec<&'static str> {
    vec![
        "2014,January,Chinalco,\"$1,200\",Toromocho Copper Mine,Peru,South America,Metals,Copper,",
        "2015,March,CATL,$800,Lithium Battery Plant,Chile,South America,Transport,Autos,BRI",
        "2015,June,Goldman Sachs Partner Fund,$300,Metal Trading JV,United Kingdom,Europe,Finance,Banking,",
        "2016,May,Shenhua,$950,Coal Mining Works,Indonesia,East Asia,Energy,Coal,BRI",
        "2016,July,Fosun,$450,Biotech Labs,USA,North America,Health,Pharmaceuticals,",
        "2017,August,Wanda,$1,Carmike Cinemas,USA,North America,Entertainment,,",
        "2017,September,Unknown,N/A,,,,,,",
        "2018,October,Tsinghua Unigroup,\"$2,300\",Chipmaker Foundry,USA,North America,Technology,Semiconductors,",
        "2018,December,Jinchuan,$600,Nickel Smelter,Indonesia,East Asia,Metals,Nickel,BRI",
    ]
}
