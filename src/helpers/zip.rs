//! ZIP archive helpers for Office Open XML (.xlsx) and OpenDocument (.ods) containers.

use crate::error::DecodeError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::ZipArchive;

pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Gets a part by name, matching case-insensitively and treating `\` as `/`.
    fn part(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, DecodeError>;

    /// Returns true if the archive contains the named part.
    fn has_part(&self, name: &str) -> bool;

    /// Creates an XML reader over a part within the archive.
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, DecodeError>;

    /// Like [`ZipHelper::xml_reader`], but a missing part is a decode failure.
    fn required_xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<XmlReader<BufReader<ZipFile<'_, RS>>>, DecodeError> {
        self.xml_reader(name)?
            .ok_or_else(|| DecodeError::MissingPart(name.to_owned()))
    }
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn part(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, DecodeError> {
        let pattern = name.replace('\\', "/");
        let path = self.file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(file_name))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) | Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn has_part(&self, name: &str) -> bool {
        let pattern = name.replace('\\', "/");
        self.file_names().any(|file_name| pattern.eq_ignore_ascii_case(file_name))
    }

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, DecodeError> {
        let reader = self
            .part(name)?
            .map(|file| XmlReader::new(BufReader::new(file)));
        Ok(reader)
    }
}
