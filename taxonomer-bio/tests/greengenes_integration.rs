/// Integration tests for GreenGenes ingestion and taxtable loading
///
/// Each test writes real input files into an isolated environment and loads
/// them into an on-disk store.
use rstest::rstest;
use taxonomer_bio::greengenes::{db_load, IngestOutcome};
use taxonomer_bio::{fetch_url, Taxtable};
use taxonomer_core::config::Config;
use taxonomer_storage::{tables, TaxDb};
use taxonomer_test::assertions::{
    assert_primary_name, assert_single_primary_names, assert_valid_intervals,
};
use taxonomer_test::fixtures::{GREENGENES_RECORDS, SAMPLE_TAXTABLE_CSV};
use taxonomer_test::{
    capture_warnings, init_test_logging, write_greengenes_file, TestEnvironment,
    POLYPHYLETIC_RECORDS, SHARED_PREFIX_RECORDS,
};

fn open_store(env: &TestEnvironment) -> TaxDb {
    TaxDb::open(env.database_path("greengenes.db"), true).unwrap()
}

fn primary_ids(db: &TaxDb, name: &str) -> Vec<String> {
    db.find_by_primary_name(name).unwrap()
}

mod ingestion_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case("gg_taxonomy.txt")]
    #[case("gg_taxonomy.txt.gz")]
    fn test_shared_prefix_builds_one_branch(#[case] file_name: &str) {
        init_test_logging();
        let env = TestEnvironment::new().unwrap();
        let path = write_greengenes_file(env.root(), file_name, SHARED_PREFIX_RECORDS).unwrap();
        let mut db = open_store(&env);

        let report = db_load(&mut db, &path, &Config::default()).unwrap();
        match report.ingest {
            IngestOutcome::Loaded(summary) => {
                assert_eq!(summary.records, 2);
                assert_eq!(summary.nodes, 5);
                assert_eq!(summary.polyphyletic_groups, 0);
            }
            IngestOutcome::Skipped => panic!("fresh store was skipped"),
        }
        assert_eq!(db.count_rows(tables::NODES).unwrap(), 5);

        let a = primary_ids(&db, "A");
        assert_eq!(a.len(), 1);
        for child in ["B", "C"] {
            let ids = primary_ids(&db, child);
            assert_eq!(ids.len(), 1);
            let node = db.node(&ids[0]).unwrap().unwrap();
            assert_eq!(node.parent_id.as_deref(), Some(a[0].as_str()));
        }
        let bacteria = db.node(&primary_ids(&db, "Bacteria")[0]).unwrap().unwrap();
        assert_eq!(bacteria.parent_id.as_deref(), Some("GG00000001"));
        assert_single_primary_names(&db);
    }

    #[test]
    fn test_polyphyletic_names_are_qualified() {
        let env = TestEnvironment::new().unwrap();
        let path = write_greengenes_file(env.root(), "gg.txt", POLYPHYLETIC_RECORDS).unwrap();
        let mut db = open_store(&env);

        db_load(&mut db, &path, &Config::default()).unwrap();

        assert_eq!(db.count_rows(tables::NODES).unwrap(), 5);
        assert!(primary_ids(&db, "Y").is_empty());
        let under_x = primary_ids(&db, "Y [X]");
        let under_z = primary_ids(&db, "Y [Z]");
        assert_eq!(under_x.len(), 1);
        assert_eq!(under_z.len(), 1);
        assert_ne!(under_x, under_z);

        let x = primary_ids(&db, "X");
        let node = db.node(&under_x[0]).unwrap().unwrap();
        assert_eq!(node.parent_id.as_deref(), Some(x[0].as_str()));
        assert_single_primary_names(&db);
    }

    #[test]
    fn test_second_load_is_a_no_op() {
        let env = TestEnvironment::new().unwrap();
        let path = write_greengenes_file(env.root(), "gg.txt", GREENGENES_RECORDS).unwrap();
        let mut db = open_store(&env);

        db_load(&mut db, &path, &Config::default()).unwrap();
        let nodes = db.count_rows(tables::NODES).unwrap();
        let names = db.count_rows(tables::NAMES).unwrap();

        let again = db_load(&mut db, &path, &Config::default()).unwrap();
        assert!(again.ingest.is_skipped());
        assert_eq!(again.species_renamed, 0);
        assert_eq!(db.count_rows(tables::NODES).unwrap(), nodes);
        assert_eq!(db.count_rows(tables::NAMES).unwrap(), names);
    }

    #[test]
    fn test_realistic_records() {
        let env = TestEnvironment::new().unwrap();
        let path = write_greengenes_file(env.root(), "gg.txt", GREENGENES_RECORDS).unwrap();
        let mut db = open_store(&env);

        db_load(&mut db, &path, &Config::default()).unwrap();

        // Glued species names are split at the genus
        let coli = primary_ids(&db, "Escherichia coli");
        assert_eq!(coli.len(), 1);
        assert_eq!(db.node(&coli[0]).unwrap().unwrap().rank.as_deref(), Some("species"));

        // The record with an empty species ends at its genus, which carries the raw lineage
        let escherichia = primary_ids(&db, "Escherichia");
        let alternates: Vec<String> = db
            .names(&escherichia[0])
            .unwrap()
            .into_iter()
            .filter(|n| !n.is_primary)
            .map(|n| n.tax_name)
            .collect();
        assert_eq!(alternates, vec![GREENGENES_RECORDS[1].1.to_string()]);

        // Archaea stops at the phylum
        let euryarchaeota = primary_ids(&db, "Euryarchaeota");
        assert_eq!(euryarchaeota.len(), 1);
        assert_eq!(db.count_rows(tables::NODES).unwrap(), 16);
    }

    #[test]
    fn test_max_rows_limits_records() {
        let env = TestEnvironment::new().unwrap();
        let path = write_greengenes_file(env.root(), "gg.txt", SHARED_PREFIX_RECORDS).unwrap();
        let mut db = open_store(&env);
        let mut config = Config::default();
        config.loader.max_rows = Some(1);

        db_load(&mut db, &path, &config).unwrap();
        // root, Bacteria, A, B
        assert_eq!(db.count_rows(tables::NODES).unwrap(), 4);
        assert!(primary_ids(&db, "C").is_empty());
    }

    #[test]
    fn test_missing_input_file() {
        let env = TestEnvironment::new().unwrap();
        let mut db = open_store(&env);
        let err = db_load(&mut db, &env.root().join("absent.txt"), &Config::default()).unwrap_err();
        assert!(err.is_fatal());
    }
}

mod species_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use taxonomer_bio::greengenes::clean_species;

    fn seed(db: &TaxDb, genus: &str, species: &str) {
        db.connection()
            .execute_batch(&format!(
                "INSERT INTO nodes (tax_id, parent_id, rank) VALUES
                     ('g1', 'g1', 'genus'), ('s1', 'g1', 'species');
                 INSERT INTO names (tax_id, tax_name, is_primary) VALUES
                     ('g1', '{}', 1), ('s1', '{}', 1);",
                genus, species
            ))
            .unwrap();
    }

    #[rstest]
    #[case("Escherichia", "Escherichiacoli", "Escherichia coli", 1)]
    #[case("Escherichia", "Escherichia coli", "Escherichia coli", 0)]
    #[case("Escherichia", "Shigella flexneri", "Shigella flexneri", 0)]
    fn test_cleanup(
        #[case] genus: &str,
        #[case] species: &str,
        #[case] expected: &str,
        #[case] renamed: usize,
    ) {
        let mut db = TaxDb::in_memory().unwrap();
        seed(&db, genus, species);

        assert_eq!(clean_species(&mut db).unwrap(), renamed);
        assert_primary_name(&db, "s1", expected);

        // Re-running leaves the result alone
        assert_eq!(clean_species(&mut db).unwrap(), 0);
        assert_primary_name(&db, "s1", expected);
    }
}

mod taxtable_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_taxtable_file_to_hierarchy() {
        let env = TestEnvironment::new().unwrap();
        let path = env
            .write_file("taxtable.csv", SAMPLE_TAXTABLE_CSV.as_bytes())
            .unwrap();
        let table = Taxtable::from_path(&path).unwrap();
        let (fieldnames, rows) = table.into_parts();

        let mut db = open_store(&env);
        db.insert_from_taxtable(&fieldnames, rows).unwrap();

        assert_valid_intervals(&db.intervals().unwrap());
        let ranks: Vec<String> = db.rank_order().unwrap().into_iter().map(|(r, _)| r).collect();
        assert_eq!(ranks, vec!["root", "phylum", "class", "genus", "species", "no_rank"]);
        assert!(db.is_ancestor_or_self("1224", "562").unwrap());
        assert!(!db.is_ancestor_or_self("1239", "562").unwrap());
    }
}

mod download_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_existing_archive_is_kept_with_a_warning() {
        let env = TestEnvironment::new().unwrap();
        let existing = env.write_file("cache/gg.txt", b"cached").unwrap();

        let (result, logged) = capture_warnings(|| {
            fetch_url("http://invalid.invalid/gg.txt", &env.root().join("cache"), false)
        });
        let (path, downloaded) = result.unwrap();
        assert_eq!(path, existing);
        assert!(!downloaded);
        assert!(logged.contains("WARN"), "logged: {}", logged);
        assert!(logged.contains("not downloading"), "logged: {}", logged);
    }
}
