#[cfg(test)]
mod tests {
    use std::io::{BufReader, Write};

    use tempfile::NamedTempFile;

    use padjmat::cli::io::open_inputs;
    use padjmat::graph::dlcbf::Dlcbf;
    use padjmat::graph::ingest::ingest;
    use padjmat::graph::kmer;
    use padjmat::graph::seedcache::SeedCache;

    /// Helper: write a string into a temp FASTA file and return the handle.
    fn write_fasta(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn reads_single_on_disk_fasta_file() {
        let tmp = write_fasta(">r1\nACGTAC\n");
        let reader = open_inputs(&[tmp.path().to_path_buf()]).expect("open_inputs");

        let dlcbf = Dlcbf::new(4096, 8);
        let seeds = SeedCache::new(4096);
        let stats = ingest(BufReader::new(reader), 4, 1, &dlcbf, &seeds, || {}).unwrap();

        assert_eq!(stats.reads, 1);
        assert_eq!(stats.kmers_fed, 3); // ACGT, CGTA, GTAC
        let acgt = kmer::canonical(0b00011011, 4);
        assert_eq!(dlcbf.get(acgt), 1);
    }

    #[test]
    fn concatenates_multiple_on_disk_fasta_files_in_order() {
        let tmp1 = write_fasta(">r1\nAAAA\n");
        let tmp2 = write_fasta(">r2\nCCCC\n");
        let paths = vec![tmp1.path().to_path_buf(), tmp2.path().to_path_buf()];
        let reader = open_inputs(&paths).expect("open_inputs");

        let dlcbf = Dlcbf::new(4096, 8);
        let seeds = SeedCache::new(4096);
        let stats = ingest(BufReader::new(reader), 4, 1, &dlcbf, &seeds, || {}).unwrap();

        assert_eq!(stats.reads, 2);
        let aaaa = kmer::canonical(0, 4);
        assert_eq!(dlcbf.get(aaaa), 1);
    }

    #[test]
    fn missing_input_file_is_a_reported_error() {
        let missing = std::path::PathBuf::from("/nonexistent/path/does-not-exist.fasta");
        let result = open_inputs(&[missing]);
        assert!(result.is_err());
    }
}
