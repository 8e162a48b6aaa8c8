use super::{Formatter, Params, ToSql};

use sprig_core::{ident, Result};

/// A table or column name. Validated against the identifier allow-list,
/// then quoted for the flavor. A name that fails validation aborts the
/// whole statement.
pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let ident = ident::validate_identifier(self.0.as_ref())?;
        let quote = f.serializer.flavor.quote();

        f.dst.push(quote);
        f.dst.push_str(ident.as_str());
        f.dst.push(quote);
        Ok(())
    }
}
