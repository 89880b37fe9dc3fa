//! In-memory OPC package backed by a ZIP archive.
//!
//! Parts are held as raw bytes in their original archive order. Editing
//! replaces individual parts; everything else is written back byte-identical
//! at the part level, with the compression method each member had.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types::ContentTypes;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::rel::Relationships;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

#[derive(Debug, Clone)]
struct PartEntry {
    name: PackURI,
    data: Vec<u8>,
    stored: bool,
}

/// Main API class for working with OPC packages.
#[derive(Debug, Clone)]
pub struct OpcPackage {
    parts: Vec<PartEntry>,
    /// Lowercased part name to index in `parts`.
    index: HashMap<String, usize>,
}

impl OpcPackage {
    /// Load a package from the bytes of a ZIP archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        let mut index = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = PackURI::from_membername(file.name());
            let stored = file.compression() == CompressionMethod::Stored;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            index.insert(name.as_str().to_ascii_lowercase(), parts.len());
            parts.push(PartEntry { name, data, stored });
        }

        let package = Self { parts, index };
        if !package.contains(CONTENT_TYPES_URI) {
            return Err(OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()));
        }
        Ok(package)
    }

    fn position(&self, partname: &str) -> Option<usize> {
        self.index.get(&partname.to_ascii_lowercase()).copied()
    }

    /// Whether a part with this name exists (part names compare case-insensitively).
    pub fn contains(&self, partname: &str) -> bool {
        self.position(partname).is_some()
    }

    /// Raw bytes of a part.
    pub fn part(&self, partname: &PackURI) -> Option<&[u8]> {
        self.position(partname.as_str()).map(|i| self.parts[i].data.as_slice())
    }

    /// Raw bytes of a part, or `PartNotFound`.
    pub fn require_part(&self, partname: &PackURI) -> Result<&[u8]> {
        self.part(partname)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Replace a part's bytes, or append a new part.
    pub fn set_part(&mut self, partname: &PackURI, data: Vec<u8>) {
        match self.position(partname.as_str()) {
            Some(i) => self.parts[i].data = data,
            None => {
                self.index
                    .insert(partname.as_str().to_ascii_lowercase(), self.parts.len());
                self.parts.push(PartEntry {
                    name: partname.clone(),
                    data,
                    stored: false,
                });
            },
        }
    }

    /// Part names in archive order.
    pub fn partnames(&self) -> impl Iterator<Item = &PackURI> {
        self.parts.iter().map(|p| &p.name)
    }

    /// Relationships of a source part; empty when it has no `.rels` part.
    pub fn rels_for(&self, source: &PackURI) -> Result<Relationships> {
        match self.part(&source.rels_uri()) {
            Some(xml) => Relationships::from_xml(source.base_uri(), xml),
            None => Ok(Relationships::new(source.base_uri().to_string())),
        }
    }

    /// Write back the `.rels` part of a source part.
    pub fn set_rels(&mut self, source: &PackURI, rels: &Relationships) {
        self.set_part(&source.rels_uri(), rels.to_xml().into_bytes());
    }

    pub fn content_types(&self) -> Result<ContentTypes> {
        let uri = PackURI::from_membername(CONTENT_TYPES_URI);
        ContentTypes::from_xml(self.require_part(&uri)?)
    }

    pub fn set_content_types(&mut self, content_types: &ContentTypes) {
        let uri = PackURI::from_membername(CONTENT_TYPES_URI);
        self.set_part(&uri, content_types.to_bytes());
    }

    /// Part name of the main document, from the package-level officeDocument relationship.
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let package = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        self.rels_for(&package)?
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?
            .target_partname()
    }

    /// First unused part name of the form `{prefix}{N}.{ext}`, N counting from 1.
    ///
    /// A number is taken when any extension uses it, so `image3.png` blocks
    /// `image3.jpeg`.
    pub fn next_partname(&self, prefix: &str, ext: &str) -> PackURI {
        let prefix_lower = prefix.to_ascii_lowercase();
        let mut used: Vec<u32> = self
            .index
            .keys()
            .filter_map(|name| name.strip_prefix(&prefix_lower))
            .filter_map(|rest| {
                let digits = rest.split('.').next()?;
                atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok()
            })
            .collect();
        used.sort_unstable();
        used.dedup();

        let mut n = 1u32;
        for &u in &used {
            if u == n {
                n += 1;
            } else if u > n {
                break;
            }
        }
        PackURI::from_membername(&format!("{}{}.{}", prefix, n, ext))
    }

    /// Serialize the package back to ZIP bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let capacity = self.parts.iter().map(|p| p.data.len()).sum::<usize>() / 2;
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::with_capacity(capacity)));
        for part in &self.parts {
            let method = if part.stored {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default()
                .compression_method(method)
                .large_file(part.data.len() as u64 >= u32::MAX as u64);
            writer.start_file(part.name.membername(), options)?;
            writer.write_all(&part.data)?;
        }
        Ok(writer.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PptxBuilder;

    #[test]
    fn test_from_bytes_and_main_part() {
        let bytes = PptxBuilder::new().slide(vec![]).build();
        let pkg = OpcPackage::from_bytes(&bytes).unwrap();
        assert_eq!(pkg.main_document_partname().unwrap().as_str(), "/ppt/presentation.xml");
        assert!(pkg.contains("/PPT/Presentation.xml"));
    }

    #[test]
    fn test_not_a_package() {
        assert!(OpcPackage::from_bytes(b"definitely not a zip").is_err());
    }

    #[test]
    fn test_untouched_parts_survive_roundtrip() {
        let bytes = PptxBuilder::new().slide(vec![]).slide(vec![]).build();
        let mut pkg = OpcPackage::from_bytes(&bytes).unwrap();
        let slide2 = PackURI::new("/ppt/slides/slide2.xml").unwrap();
        let before = pkg.part(&slide2).unwrap().to_vec();

        let slide1 = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        pkg.set_part(&slide1, b"<changed/>".to_vec());

        let reopened = OpcPackage::from_bytes(&pkg.to_bytes().unwrap()).unwrap();
        assert_eq!(reopened.part(&slide2).unwrap(), before.as_slice());
        assert_eq!(reopened.part(&slide1).unwrap(), b"<changed/>");
        let names: Vec<_> = reopened.partnames().map(|p| p.to_string()).collect();
        let original: Vec<_> = pkg.partnames().map(|p| p.to_string()).collect();
        assert_eq!(names, original);
    }

    #[test]
    fn test_next_partname_skips_any_extension() {
        let bytes = PptxBuilder::new()
            .media("image1.png", vec![1])
            .media("image2.jpeg", vec![2])
            .slide(vec![])
            .build();
        let pkg = OpcPackage::from_bytes(&bytes).unwrap();
        assert_eq!(
            pkg.next_partname("/ppt/media/image", "png").as_str(),
            "/ppt/media/image3.png"
        );
    }
}
