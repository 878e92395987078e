use std::path::Path;

/// File-format classification tag. Only the tag matters here; the
/// contents of alignment output are never interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Fastq,
    Sam,
    Bam,
    Fofn,
    Xml,
    #[default]
    Unknown,
}

impl FileFormat {
    /// Classify a path by its (case-insensitive) extension.
    pub fn of(path: &str) -> FileFormat {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".fa") || lower.ends_with(".fsta") || lower.ends_with(".fasta") {
            FileFormat::Fasta
        } else if lower.ends_with(".fq") || lower.ends_with(".fastq") {
            FileFormat::Fastq
        } else if lower.ends_with(".sam") {
            FileFormat::Sam
        } else if lower.ends_with(".bam") {
            FileFormat::Bam
        } else if lower.ends_with(".fofn") {
            FileFormat::Fofn
        } else if lower.ends_with(".xml") {
            FileFormat::Xml
        } else {
            FileFormat::Unknown
        }
    }

    /// Like `of`, but a FOFN on disk is classified by the first file
    /// it lists. One level deep, a FOFN listing FOFNs stays `Fofn`.
    pub fn resolve(path: &str) -> FileFormat {
        let fmt = Self::of(path);
        if fmt != FileFormat::Fofn || !Path::new(path).exists() {
            return fmt;
        }

        let Ok(reader) = crate::reader(path) else {
            return fmt;
        };
        use std::io::BufRead;
        for line in reader.lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let inner = Self::of(line);
            if inner != FileFormat::Fofn {
                return inner;
            }
            break;
        }
        fmt
    }
}

/// Locations of every file taking part in one alignment run. All
/// required paths are filled before the descriptor reaches command
/// synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignFiles {
    pub query_file: String,
    pub target_file: String,
    /// Where the aligner itself writes, blasr `-out`
    pub aligner_out_file: String,
    /// The run's final output, decides the output container flag
    pub output_file: String,
    /// Precomputed suffix-array index, blasr `-sa`
    pub sa_file: Option<String>,
    pub region_table: Option<String>,
    pub input_format: FileFormat,
    pub output_format: FileFormat,
}

impl AlignFiles {
    pub fn new(query_file: &str, target_file: &str, output_file: &str) -> Self {
        AlignFiles {
            query_file: query_file.to_string(),
            target_file: target_file.to_string(),
            aligner_out_file: output_file.to_string(),
            output_file: output_file.to_string(),
            sa_file: None,
            region_table: None,
            input_format: FileFormat::resolve(query_file),
            output_format: FileFormat::of(output_file),
        }
    }
}
