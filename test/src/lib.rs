#[cfg(test)]
mod cover;
#[cfg(test)]
mod flows;
#[cfg(test)]
mod paint;
#[cfg(test)]
mod sets;
#[cfg(test)]
mod text;

pub mod support;
